//! # VASP POSCAR 读写
//!
//! 解析 POSCAR/CONTCAR 文件，并把结构写回 VASP 5 格式。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor (负值表示目标体积)
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ```
//!
//! 写出时原子按元素首次出现顺序分组，同组内保持原有顺序，
//! 因此 slab 的"从上到下"顺序在每个元素组内得以保留。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs`, `vasp/poscar.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{Result, SlabkitError};
use crate::models::{Atom, Crystal, Lattice};
use std::fs;
use std::path::Path;

/// 写出 POSCAR 时的坐标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateMode {
    #[default]
    Direct,
    Cartesian,
}

/// 解析 POSCAR/CONTCAR 文件
pub fn parse_poscar_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| SlabkitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut crystal = parse_poscar_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )?;
    crystal.source = Some(path.display().to_string());
    Ok(crystal)
}

fn parse_error(name: &str, reason: impl Into<String>) -> SlabkitError {
    SlabkitError::ParseError {
        format: "poscar".to_string(),
        path: name.to_string(),
        reason: reason.into(),
    }
}

fn parse_triplet(line: &str) -> Option<[f64; 3]> {
    let parts: Vec<f64> = line
        .split_whitespace()
        .take(3)
        .map_while(|s| s.parse().ok())
        .collect();
    (parts.len() == 3).then(|| [parts[0], parts[1], parts[2]])
}

/// 从字符串内容解析 POSCAR 格式
pub fn parse_poscar_content(content: &str, default_name: &str) -> Result<Crystal> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 8 {
        return Err(parse_error(default_name, "File too short"));
    }

    let name = match lines[0].trim() {
        "" => default_name.to_string(),
        s => s.to_string(),
    };

    let scale: f64 = lines[1]
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| parse_error(&name, "Invalid scaling factor"))?;

    let mut matrix = [[0.0; 3]; 3];
    for (i, row) in matrix.iter_mut().enumerate() {
        *row = parse_triplet(lines[2 + i])
            .ok_or_else(|| parse_error(&name, format!("Invalid lattice vector at line {}", 3 + i)))?;
    }

    // 负的缩放因子表示晶胞体积
    let factor = if scale < 0.0 {
        let raw_volume = Lattice::from_vectors(matrix).volume().abs();
        if raw_volume < 1e-12 {
            return Err(parse_error(&name, "Degenerate lattice"));
        }
        (-scale / raw_volume).cbrt()
    } else {
        scale
    };
    for row in matrix.iter_mut() {
        for x in row.iter_mut() {
            *x *= factor;
        }
    }
    let lattice = Lattice::from_vectors(matrix);

    let species_parts: Vec<&str> = lines[5].split_whitespace().collect();
    if species_parts.is_empty() {
        return Err(parse_error(&name, "Missing species line"));
    }
    let (elements, counts, mut coord_line) = if species_parts[0].parse::<usize>().is_ok() {
        // VASP 4：没有元素行，尝试从注释行读取元素
        let counts: Vec<usize> = species_parts.iter().filter_map(|s| s.parse().ok()).collect();
        let from_comment: Vec<String> = name
            .split_whitespace()
            .take(counts.len())
            .map(|s| s.to_string())
            .collect();
        let elements = if from_comment.len() == counts.len()
            && from_comment.iter().all(|s| crate::models::elements::is_element(s))
        {
            from_comment
        } else {
            (0..counts.len()).map(|i| format!("X{}", i + 1)).collect()
        };
        (elements, counts, 6)
    } else {
        // 去掉 POTCAR 风格的后缀，如 "Bi_d" 或 "Fe/abc123"
        let elements: Vec<String> = species_parts
            .iter()
            .map(|s| s.split(['_', '/']).next().unwrap_or(s).to_string())
            .collect();
        let counts: Vec<usize> = lines[6]
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        (elements, counts, 7)
    };

    if elements.len() != counts.len() {
        return Err(parse_error(
            &name,
            format!(
                "{} species but {} counts",
                elements.len(),
                counts.len()
            ),
        ));
    }

    if lines
        .get(coord_line)
        .is_some_and(|l| l.trim().to_lowercase().starts_with('s'))
    {
        coord_line += 1;
    }

    let coord_type = lines
        .get(coord_line)
        .map(|l| l.trim().to_lowercase())
        .ok_or_else(|| parse_error(&name, "Missing coordinate type line"))?;
    let is_cartesian = coord_type.starts_with('c') || coord_type.starts_with('k');

    let mut atoms: Vec<Atom> = Vec::with_capacity(counts.iter().sum());
    let mut line_idx = coord_line + 1;

    for (elem, &count) in elements.iter().zip(counts.iter()) {
        for _ in 0..count {
            let raw = lines
                .get(line_idx)
                .and_then(|l| parse_triplet(l))
                .ok_or_else(|| parse_error(&name, format!("Invalid position at line {}", line_idx + 1)))?;

            let position = if is_cartesian {
                let cart = [raw[0] * factor, raw[1] * factor, raw[2] * factor];
                lattice
                    .to_fractional(cart)
                    .ok_or_else(|| parse_error(&name, "Degenerate lattice"))?
            } else {
                raw
            };
            atoms.push(Atom::new(elem.clone(), position));
            line_idx += 1;
        }
    }

    let mut crystal = Crystal::new(name, lattice, atoms);
    crystal.source = Some("poscar".to_string());

    Ok(crystal)
}

/// 将 Crystal 转换为 POSCAR 格式字符串
pub fn to_poscar_string(crystal: &Crystal, mode: CoordinateMode) -> String {
    let order = crystal.species_order();

    let mut result = String::new();
    result.push_str(&format!("{}\n", crystal.name));
    result.push_str("1.0\n");

    for row in &crystal.lattice.matrix {
        result.push_str(&format!(
            "  {:16.10}  {:16.10}  {:16.10}\n",
            row[0], row[1], row[2]
        ));
    }

    result.push_str(&format!("   {}\n", order.join("   ")));
    let counts: Vec<String> = order
        .iter()
        .map(|e| {
            crystal
                .atoms
                .iter()
                .filter(|a| &a.element == e)
                .count()
                .to_string()
        })
        .collect();
    result.push_str(&format!("   {}\n", counts.join("   ")));

    result.push_str(match mode {
        CoordinateMode::Direct => "Direct\n",
        CoordinateMode::Cartesian => "Cartesian\n",
    });

    for elem in &order {
        for atom in crystal.atoms.iter().filter(|a| &a.element == elem) {
            let pos = match mode {
                CoordinateMode::Direct => atom.position,
                CoordinateMode::Cartesian => crystal.lattice.to_cartesian(atom.position),
            };
            result.push_str(&format!(
                "  {:16.10}  {:16.10}  {:16.10} {}\n",
                pos[0], pos[1], pos[2], atom.element
            ));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poscar_vasp5() {
        let content = r#"NaCl
1.0
5.64 0.0 0.0
0.0 5.64 0.0
0.0 0.0 5.64
Na Cl
4 4
Direct
0.0 0.0 0.0
0.5 0.5 0.0
0.5 0.0 0.5
0.0 0.5 0.5
0.5 0.0 0.0
0.0 0.5 0.0
0.0 0.0 0.5
0.5 0.5 0.5
"#;
        let crystal = parse_poscar_content(content, "NaCl").unwrap();
        assert_eq!(crystal.name, "NaCl");
        assert_eq!(crystal.atoms.len(), 8);
        assert_eq!(crystal.reduced_formula(), "NaCl");
    }

    #[test]
    fn test_parse_poscar_with_scale() {
        let content = r#"Si
2.0
2.0 0.0 0.0
0.0 2.0 0.0
0.0 0.0 2.0
Si
2
Direct
0.0 0.0 0.0
0.5 0.5 0.5
"#;
        let crystal = parse_poscar_content(content, "Si").unwrap();
        let [a, _, _] = crystal.lattice.abc();
        assert!((a - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_poscar_negative_scale_is_volume() {
        let content = "Po\n-27.0\n1 0 0\n0 1 0\n0 0 1\nPo\n1\nDirect\n0 0 0\n";
        let crystal = parse_poscar_content(content, "Po").unwrap();
        assert!((crystal.lattice.volume() - 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_poscar_cartesian() {
        let content = "Fe\n1.0\n2.0 0 0\n0 2.0 0\n0 0 4.0\nFe\n1\nCartesian\n1.0 1.0 1.0\n";
        let crystal = parse_poscar_content(content, "Fe").unwrap();
        let p = crystal.atoms[0].position;
        assert!((p[0] - 0.5).abs() < 1e-12);
        assert!((p[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_write_then_parse_preserves_structure() {
        let lattice = Lattice::from_vectors([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]]);
        let atoms = vec![
            Atom::new("O", [0.5, 0.5, 0.75]),
            Atom::new("Ti", [0.0, 0.0, 0.5]),
            Atom::new("O", [0.5, 0.0, 0.25]),
        ];
        let crystal = Crystal::new("TiO2", lattice, atoms);

        for mode in [CoordinateMode::Direct, CoordinateMode::Cartesian] {
            let text = to_poscar_string(&crystal, mode);
            let parsed = parse_poscar_content(&text, "written").unwrap();
            assert_eq!(parsed.species_order(), vec!["O", "Ti"]);
            // 同元素内保持原有顺序
            assert!((parsed.atoms[0].position[2] - 0.75).abs() < 1e-9);
            assert!((parsed.atoms[1].position[2] - 0.25).abs() < 1e-9);
            assert_eq!(parsed.atoms[2].element, "Ti");
        }
    }

    #[test]
    fn test_parse_poscar_selective_dynamics_and_potcar_suffix() {
        let content = r#"Bi with selective
1.0
4.5 0.0 0.0
0.0 4.5 0.0
0.0 0.0 4.5
Bi_d
2
Selective dynamics
Direct
0.0 0.0 0.0 T T T
0.5 0.5 0.5 F F F
"#;
        let crystal = parse_poscar_content(content, "Bi").unwrap();
        assert_eq!(crystal.atoms.len(), 2);
        assert_eq!(crystal.atoms[0].element, "Bi");
    }

    #[test]
    fn test_truncated_positions_rejected() {
        let content = "Si\n1.0\n1 0 0\n0 1 0\n0 0 1\nSi\n2\nDirect\n0 0 0\n";
        assert!(parse_poscar_content(content, "Si").is_err());
    }
}
