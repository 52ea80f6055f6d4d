//! # 晶体结构数据模型
//!
//! 定义统一的晶体结构表示：数据库获取的体相结构与切出的 slab 共用同一模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `provider/`, `slab/`, `symmetry/`, `vasp/` 使用
//! - 使用 `models/composition.rs` 计算约化化学式

use crate::models::composition::Composition;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶格
    /// 角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let cos_alpha = alpha.to_radians().cos();
        let cos_beta = beta.to_radians().cos();
        let cos_gamma = gamma.to_radians().cos();
        let sin_gamma = gamma.to_radians().sin();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).sqrt();

        Lattice {
            matrix: [a_vec, b_vec, [c1, c2, c3]],
        }
    }

    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 以列向量 (a, b, c) 形式返回 nalgebra 矩阵
    pub fn column_matrix(&self) -> Matrix3<f64> {
        Matrix3::from_columns(&[
            Vector3::from(self.matrix[0]),
            Vector3::from(self.matrix[1]),
            Vector3::from(self.matrix[2]),
        ])
    }

    /// 晶格常数 (a, b, c)
    pub fn abc(&self) -> [f64; 3] {
        let norm = |v: [f64; 3]| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        [
            norm(self.matrix[0]),
            norm(self.matrix[1]),
            norm(self.matrix[2]),
        ]
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a, b, c] = self.abc();
        let dot = |u: [f64; 3], v: [f64; 3]| u[0] * v[0] + u[1] * v[1] + u[2] * v[2];

        let alpha = (dot(self.matrix[1], self.matrix[2]) / (b * c)).acos().to_degrees();
        let beta = (dot(self.matrix[0], self.matrix[2]) / (a * c)).acos().to_degrees();
        let gamma = (dot(self.matrix[0], self.matrix[1]) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积（带符号）
    pub fn volume(&self) -> f64 {
        self.column_matrix().determinant()
    }

    /// 分数坐标转笛卡尔坐标
    pub fn to_cartesian(&self, frac: [f64; 3]) -> [f64; 3] {
        let m = self.matrix;
        [
            frac[0] * m[0][0] + frac[1] * m[1][0] + frac[2] * m[2][0],
            frac[0] * m[0][1] + frac[1] * m[1][1] + frac[2] * m[2][1],
            frac[0] * m[0][2] + frac[1] * m[1][2] + frac[2] * m[2][2],
        ]
    }

    /// 笛卡尔坐标转分数坐标；晶格退化时返回 None
    pub fn to_fractional(&self, cart: [f64; 3]) -> Option<[f64; 3]> {
        let inv = self.column_matrix().try_inverse()?;
        let f = inv * Vector3::from(cart);
        Some([f.x, f.y, f.z])
    }
}

/// 原子信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
        }
    }
}

/// 晶体结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crystal {
    /// 结构名称
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表（顺序有意义：slab 按表面法向从上到下排列）
    pub atoms: Vec<Atom>,

    /// 空间群符号（由数据库或 CIF 提供时记录）
    pub space_group: Option<String>,

    /// 来源（文件格式或数据库 ID）
    pub source: Option<String>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
            space_group: None,
            source: None,
        }
    }

    /// 原子（位点）数
    pub fn num_sites(&self) -> usize {
        self.atoms.len()
    }

    /// 成分
    pub fn composition(&self) -> Composition {
        Composition::from_elements(self.atoms.iter().map(|a| a.element.as_str()))
    }

    /// 约化化学式，例如 Bi8Se12 -> Bi2Se3
    pub fn reduced_formula(&self) -> String {
        self.composition().reduced_formula()
    }

    /// 第 i 个位点的笛卡尔坐标
    pub fn cart_coords(&self, index: usize) -> Option<[f64; 3]> {
        self.atoms
            .get(index)
            .map(|a| self.lattice.to_cartesian(a.position))
    }

    /// 按首次出现顺序排列的元素列表
    pub fn species_order(&self) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        for atom in &self.atoms {
            if !order.contains(&atom.element) {
                order.push(atom.element.clone());
            }
        }
        order
    }
}
