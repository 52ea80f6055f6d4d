//! # 对称性分析模块
//!
//! 对称操作搜索、点群分类、slab 上下表面对称性判断。
//!
//! ## 依赖关系
//! - 被 `slab/` 使用
//! - 子模块: finder, pointgroup

pub mod finder;
pub mod pointgroup;

pub use finder::{SymmetryFinder, SymmetryOperation};

use crate::models::Crystal;

/// 体相结构的对称性标签：优先使用数据来源提供的空间群符号，否则给出点群符号
pub fn symmetry_label(crystal: &Crystal) -> String {
    if let Some(symbol) = crystal.space_group.as_deref().filter(|s| !s.is_empty()) {
        return symbol.to_string();
    }
    let operations = SymmetryFinder::default().find_operations(crystal);
    pointgroup::classify(&operations)
        .unwrap_or("1")
        .to_string()
}

/// slab 是否上下对称：存在把表面法向 z 翻转为 -z 的对称操作
pub fn is_symmetric_slab(slab: &Crystal, finder: &SymmetryFinder) -> bool {
    finder
        .find_operations(slab)
        .iter()
        .any(|op| op.cartesian_rotation[(2, 2)] < -0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};

    fn slab(atoms: Vec<Atom>) -> Crystal {
        let lattice = Lattice::from_parameters(3.0, 3.0, 20.0, 90.0, 90.0, 90.0);
        Crystal::new("slab", lattice, atoms)
    }

    #[test]
    fn test_symmetric_single_species_slab() {
        let atoms = vec![
            Atom::new("Po", [0.0, 0.0, 0.45]),
            Atom::new("Po", [0.0, 0.0, 0.30]),
            Atom::new("Po", [0.0, 0.0, 0.15]),
        ];
        assert!(is_symmetric_slab(&slab(atoms), &SymmetryFinder::default()));
    }

    #[test]
    fn test_asymmetric_terminations() {
        let atoms = vec![
            Atom::new("Na", [0.0, 0.0, 0.45]),
            Atom::new("Cl", [0.5, 0.5, 0.35]),
            Atom::new("Na", [0.0, 0.0, 0.25]),
            Atom::new("Cl", [0.5, 0.5, 0.15]),
        ];
        assert!(!is_symmetric_slab(&slab(atoms), &SymmetryFinder::default()));
    }

    #[test]
    fn test_symmetry_label_prefers_recorded_space_group() {
        let lattice = Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0);
        let mut crystal = Crystal::new("Cu", lattice, vec![Atom::new("Cu", [0.0, 0.0, 0.0])]);
        assert_eq!(symmetry_label(&crystal), "m-3m");
        crystal.space_group = Some("Fm-3m".to_string());
        assert_eq!(symmetry_label(&crystal), "Fm-3m");
    }
}
