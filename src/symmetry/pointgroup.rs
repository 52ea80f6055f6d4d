//! # 点群分类
//!
//! 按旋转类型 (det, trace) 计数，与 32 个晶体学点群的特征表比对。
//! 旋转类型顺序: [-6, -4, -3, -2, -1, 1, 2, 3, 4, 6]
//!
//! ## 依赖关系
//! - 被 `symmetry/mod.rs` 使用
//! - 使用 `symmetry/finder.rs` 的 `SymmetryOperation`

use super::finder::SymmetryOperation;

/// (Hermann–Mauguin 符号, 各旋转类型的数目)
const POINT_GROUPS: [(&str, [usize; 10]); 32] = [
    ("1", [0, 0, 0, 0, 0, 1, 0, 0, 0, 0]),
    ("-1", [0, 0, 0, 0, 1, 1, 0, 0, 0, 0]),
    ("2", [0, 0, 0, 0, 0, 1, 1, 0, 0, 0]),
    ("m", [0, 0, 0, 1, 0, 1, 0, 0, 0, 0]),
    ("2/m", [0, 0, 0, 1, 1, 1, 1, 0, 0, 0]),
    ("222", [0, 0, 0, 0, 0, 1, 3, 0, 0, 0]),
    ("mm2", [0, 0, 0, 2, 0, 1, 1, 0, 0, 0]),
    ("mmm", [0, 0, 0, 3, 1, 1, 3, 0, 0, 0]),
    ("4", [0, 0, 0, 0, 0, 1, 1, 0, 2, 0]),
    ("-4", [0, 2, 0, 0, 0, 1, 1, 0, 0, 0]),
    ("4/m", [0, 2, 0, 1, 1, 1, 1, 0, 2, 0]),
    ("422", [0, 0, 0, 0, 0, 1, 5, 0, 2, 0]),
    ("4mm", [0, 0, 0, 4, 0, 1, 1, 0, 2, 0]),
    ("-42m", [0, 2, 0, 2, 0, 1, 3, 0, 0, 0]),
    ("4/mmm", [0, 2, 0, 5, 1, 1, 5, 0, 2, 0]),
    ("3", [0, 0, 0, 0, 0, 1, 0, 2, 0, 0]),
    ("-3", [0, 0, 2, 0, 1, 1, 0, 2, 0, 0]),
    ("32", [0, 0, 0, 0, 0, 1, 3, 2, 0, 0]),
    ("3m", [0, 0, 0, 3, 0, 1, 0, 2, 0, 0]),
    ("-3m", [0, 0, 2, 3, 1, 1, 3, 2, 0, 0]),
    ("6", [0, 0, 0, 0, 0, 1, 1, 2, 0, 2]),
    ("-6", [2, 0, 0, 1, 0, 1, 0, 2, 0, 0]),
    ("6/m", [2, 0, 2, 1, 1, 1, 1, 2, 0, 2]),
    ("622", [0, 0, 0, 0, 0, 1, 7, 2, 0, 2]),
    ("6mm", [0, 0, 0, 6, 0, 1, 1, 2, 0, 2]),
    ("-6m2", [2, 0, 0, 4, 0, 1, 3, 2, 0, 0]),
    ("6/mmm", [2, 0, 2, 7, 1, 1, 7, 2, 0, 2]),
    ("23", [0, 0, 0, 0, 0, 1, 3, 8, 0, 0]),
    ("m-3", [0, 0, 8, 3, 1, 1, 3, 8, 0, 0]),
    ("432", [0, 0, 0, 0, 0, 1, 9, 8, 6, 0]),
    ("-43m", [0, 6, 0, 6, 0, 1, 3, 8, 0, 0]),
    ("m-3m", [0, 6, 8, 9, 1, 1, 9, 8, 6, 0]),
];

/// 旋转类型在计数数组中的下标；非晶体学旋转返回 None
fn rotation_type_index(det: i32, trace: i32) -> Option<usize> {
    match (det, trace) {
        (-1, -2) => Some(0), // -6
        (-1, -1) => Some(1), // -4
        (-1, 0) => Some(2),  // -3
        (-1, 1) => Some(3),  // -2 (m)
        (-1, -3) => Some(4), // -1
        (1, 3) => Some(5),   // 1
        (1, -1) => Some(6),  // 2
        (1, 0) => Some(7),   // 3
        (1, 1) => Some(8),   // 4
        (1, 2) => Some(9),   // 6
        _ => None,
    }
}

/// 由对称操作集合得到点群符号
pub fn classify(operations: &[SymmetryOperation]) -> Option<&'static str> {
    let mut counts = [0usize; 10];
    for op in operations {
        let idx = rotation_type_index(op.determinant(), op.trace())?;
        counts[idx] += 1;
    }

    POINT_GROUPS
        .iter()
        .find(|(_, table)| *table == counts)
        .map(|(symbol, _)| *symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Crystal, Lattice};
    use crate::symmetry::finder::SymmetryFinder;

    fn point_group_of(crystal: &Crystal) -> Option<&'static str> {
        classify(&SymmetryFinder::default().find_operations(crystal))
    }

    #[test]
    fn test_table_orders_sum_to_group_orders() {
        let orders: Vec<usize> = POINT_GROUPS.iter().map(|(_, t)| t.iter().sum()).collect();
        assert_eq!(orders.iter().max(), Some(&48));
        assert!(orders.iter().all(|o| 48 % o == 0));
    }

    #[test]
    fn test_cubic_is_m3m() {
        let lattice = Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0);
        let crystal = Crystal::new("Cu", lattice, vec![Atom::new("Cu", [0.0, 0.0, 0.0])]);
        assert_eq!(point_group_of(&crystal), Some("m-3m"));
    }

    #[test]
    fn test_hexagonal_is_6_mmm() {
        let lattice = Lattice::from_parameters(3.2, 3.2, 5.2, 90.0, 90.0, 120.0);
        let crystal = Crystal::new("Mg", lattice, vec![Atom::new("Mg", [0.0, 0.0, 0.0])]);
        assert_eq!(point_group_of(&crystal), Some("6/mmm"));
    }

    #[test]
    fn test_orthorhombic_is_mmm() {
        let lattice = Lattice::from_parameters(3.0, 4.0, 5.0, 90.0, 90.0, 90.0);
        let crystal = Crystal::new("X", lattice, vec![Atom::new("Si", [0.0, 0.0, 0.0])]);
        assert_eq!(point_group_of(&crystal), Some("mmm"));
    }

    #[test]
    fn test_polar_layers_lose_inversion() {
        // 沿 c 的 A-B 非等距堆叠：4mm
        let lattice = Lattice::from_parameters(3.0, 3.0, 6.0, 90.0, 90.0, 90.0);
        let atoms = vec![
            Atom::new("Ga", [0.0, 0.0, 0.0]),
            Atom::new("N", [0.0, 0.0, 0.3]),
        ];
        let crystal = Crystal::new("GaN", lattice, atoms);
        assert_eq!(point_group_of(&crystal), Some("4mm"));
    }
}
