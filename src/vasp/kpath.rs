//! # slab 能带 k 点路径
//!
//! 按 slab 面内二维 Bravais 格子类型选取高对称路径，写成 VASP line-mode KPOINTS。
//!
//! | 类型 | 路径 |
//! |------|------|
//! | 正方 | Γ-X-M-Γ |
//! | 矩形 | Γ-X-S-Y-Γ |
//! | 六方 | Γ-M-K-Γ（K 坐标随 γ = 60°/120° 不同） |
//! | 斜方 | Γ-X-S-Y-Γ |
//!
//! ## 依赖关系
//! - 被 `vasp/mod.rs`, `slab/aggregate.rs`, `commands/kpath.rs` 使用
//! - 使用 `parsers/poscar.rs` 读取 POSCAR

use super::InputFile;
use crate::error::Result;
use crate::models::Crystal;
use crate::parsers::poscar;

use std::fmt;
use std::path::Path;

pub const DEFAULT_DIVISIONS: usize = 20;

const LENGTH_TOLERANCE: f64 = 1e-3;
const ANGLE_TOLERANCE: f64 = 0.5;

/// 二维 Bravais 格子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lattice2D {
    Square,
    Rectangular,
    /// γ = 120°
    Hexagonal,
    /// γ = 60°
    HexagonalAcute,
    Oblique,
}

impl fmt::Display for Lattice2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lattice2D::Square => "square",
            Lattice2D::Rectangular => "rectangular",
            Lattice2D::Hexagonal | Lattice2D::HexagonalAcute => "hexagonal",
            Lattice2D::Oblique => "oblique",
        };
        write!(f, "{}", name)
    }
}

impl Lattice2D {
    /// 由面内晶格常数 a, b 与夹角 γ（度）分类
    pub fn classify(a: f64, b: f64, gamma: f64) -> Self {
        let equal = (a - b).abs() <= LENGTH_TOLERANCE * a.max(b);
        let near = |target: f64| (gamma - target).abs() <= ANGLE_TOLERANCE;

        match (equal, near(90.0), near(120.0), near(60.0)) {
            (true, true, _, _) => Lattice2D::Square,
            (false, true, _, _) => Lattice2D::Rectangular,
            (true, _, true, _) => Lattice2D::Hexagonal,
            (true, _, _, true) => Lattice2D::HexagonalAcute,
            _ => Lattice2D::Oblique,
        }
    }

    /// 高对称点（倒格子分数坐标），按路径顺序，首尾均为 Γ
    pub fn path(&self) -> Vec<(&'static str, [f64; 3])> {
        const GAMMA: (&str, [f64; 3]) = ("\\Gamma", [0.0, 0.0, 0.0]);
        match self {
            Lattice2D::Square => vec![
                GAMMA,
                ("X", [0.5, 0.0, 0.0]),
                ("M", [0.5, 0.5, 0.0]),
                GAMMA,
            ],
            Lattice2D::Hexagonal => vec![
                GAMMA,
                ("M", [0.5, 0.0, 0.0]),
                ("K", [1.0 / 3.0, 1.0 / 3.0, 0.0]),
                GAMMA,
            ],
            Lattice2D::HexagonalAcute => vec![
                GAMMA,
                ("M", [0.5, 0.0, 0.0]),
                ("K", [2.0 / 3.0, 1.0 / 3.0, 0.0]),
                GAMMA,
            ],
            Lattice2D::Rectangular | Lattice2D::Oblique => vec![
                GAMMA,
                ("X", [0.5, 0.0, 0.0]),
                ("S", [0.5, 0.5, 0.0]),
                ("Y", [0.0, 0.5, 0.0]),
                GAMMA,
            ],
        }
    }
}

/// line-mode KPOINTS 文件
#[derive(Debug, Clone, PartialEq)]
pub struct KpathFile {
    pub lattice: Lattice2D,
    pub divisions: usize,
}

impl KpathFile {
    pub fn from_structure(structure: &Crystal, divisions: usize) -> Self {
        let (a, b, _, _, _, gamma) = structure.lattice.parameters();
        KpathFile {
            lattice: Lattice2D::classify(a, b, gamma),
            divisions,
        }
    }
}

impl InputFile for KpathFile {
    fn render(&self) -> Result<String> {
        let mut out = String::new();
        out.push_str("Line_mode KPOINTS file\n");
        out.push_str(&format!("{}\n", self.divisions));
        out.push_str("Line_mode\n");
        out.push_str("Reciprocal\n");

        let points = self.lattice.path();
        for pair in points.windows(2) {
            for (label, k) in pair {
                out.push_str(&format!(
                    "{:.8} {:.8} {:.8} ! {}\n",
                    k[0], k[1], k[2], label
                ));
            }
            out.push('\n');
        }
        Ok(out)
    }
}

/// 读取 POSCAR，生成对应的 k 点路径并写入 `kpath_path`
pub fn make_kpath(poscar_path: &Path, kpath_path: &Path) -> Result<KpathFile> {
    let structure = poscar::parse_poscar_file(poscar_path)?;
    let kpath = KpathFile::from_structure(&structure, DEFAULT_DIVISIONS);
    kpath.write_file(kpath_path)?;
    Ok(kpath)
}
