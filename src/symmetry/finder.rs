//! # 对称操作搜索
//!
//! 在约化晶格上枚举保持度规的整数旋转矩阵，并为每个旋转寻找使所有原子
//! 映射到同种原子上的平移。
//!
//! ## 算法概述
//! 1. LLL 约化晶格，坐标变换到约化基
//! 2. 枚举元素取 {-1, 0, 1} 的 3x3 整数矩阵，筛选 det = ±1 且 WᵀGW ≈ G
//! 3. 以原子数最少的元素为参考，尝试 t = x_j - W x_ref
//! 4. 检查所有原子在 `symprec` (Å) 内映射到同种原子
//!
//! ## 依赖关系
//! - 被 `symmetry/mod.rs` 使用
//! - 使用 `math/lll.rs`, `models/structure.rs`

use crate::math::lll;
use crate::models::Crystal;

use nalgebra::{Matrix3, Vector3};

/// 一个空间群操作的旋转部分（已确认存在配套平移），W 作用于约化基下的分数坐标
#[derive(Debug, Clone)]
pub struct SymmetryOperation {
    /// 约化基下的整数旋转
    pub rotation: Matrix3<i32>,
    /// 笛卡尔旋转矩阵 R = L W L⁻¹
    pub cartesian_rotation: Matrix3<f64>,
}

impl SymmetryOperation {
    pub fn determinant(&self) -> i32 {
        let m = &self.rotation;
        m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
            - m[(0, 1)] * (m[(1, 0)] * m[(2, 2)] - m[(1, 2)] * m[(2, 0)])
            + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
    }

    pub fn trace(&self) -> i32 {
        self.rotation.trace()
    }
}

/// 对称操作搜索器
#[derive(Debug, Clone, Copy)]
pub struct SymmetryFinder {
    /// 位置容差 (Å)
    symprec: f64,
}

impl Default for SymmetryFinder {
    fn default() -> Self {
        SymmetryFinder { symprec: 0.1 }
    }
}

impl SymmetryFinder {
    pub fn new(symprec: f64) -> Self {
        SymmetryFinder { symprec }
    }

    /// 找出结构的全部旋转部分（每个旋转附带一个可行平移）
    pub fn find_operations(&self, crystal: &Crystal) -> Vec<SymmetryOperation> {
        if crystal.atoms.is_empty() {
            return Vec::new();
        }

        let original = crystal.lattice.column_matrix();
        let reduced = lll::lll_reduce(original);
        let reduced_inv = match reduced.try_inverse() {
            Some(inv) => inv,
            None => return Vec::new(),
        };

        let positions: Vec<Vector3<f64>> = crystal
            .atoms
            .iter()
            .map(|a| {
                let f = reduced_inv * (original * Vector3::from(a.position));
                f.map(|x| x.rem_euclid(1.0))
            })
            .collect();
        let elements: Vec<&str> = crystal.atoms.iter().map(|a| a.element.as_str()).collect();

        // 原子数最少的元素作为平移参考
        let reference = elements
            .iter()
            .min_by_key(|el| elements.iter().filter(|e| e == el).count())
            .copied()
            .unwrap_or_default();
        let ref_index = elements.iter().position(|e| *e == reference).unwrap_or(0);

        let metric = reduced.transpose() * reduced;
        let mut operations = Vec::new();

        for w in self.lattice_rotations(&metric) {
            let wf = w.map(|x| x as f64);
            let image_ref = wf * positions[ref_index];

            for (j, pos_j) in positions.iter().enumerate() {
                if elements[j] != reference {
                    continue;
                }
                let t = wrap(pos_j - image_ref);
                if self.maps_onto(&reduced, &positions, &elements, &wf, &t) {
                    operations.push(SymmetryOperation {
                        rotation: w,
                        cartesian_rotation: reduced * wf * reduced_inv,
                    });
                    break;
                }
            }
        }

        operations
    }

    /// 保持晶格度规的整数旋转（约化基下）
    fn lattice_rotations(&self, metric: &Matrix3<f64>) -> Vec<Matrix3<i32>> {
        let lengths = Vector3::new(
            metric[(0, 0)].sqrt(),
            metric[(1, 1)].sqrt(),
            metric[(2, 2)].sqrt(),
        );
        let mut rotations = Vec::new();

        for code in 0..19683usize {
            let mut entries = [0i32; 9];
            let mut c = code;
            for entry in entries.iter_mut() {
                *entry = (c % 3) as i32 - 1;
                c /= 3;
            }
            let w = Matrix3::from_row_slice(&entries);
            let wf = w.map(|x| x as f64);

            let det = wf.determinant();
            if (det.abs() - 1.0).abs() > 1e-6 {
                continue;
            }

            let transformed = wf.transpose() * metric * wf;
            let preserves = (0..3).all(|i| {
                (0..3).all(|j| {
                    let tol = self.symprec * (lengths[i] + lengths[j]);
                    (transformed[(i, j)] - metric[(i, j)]).abs() <= tol
                })
            });
            if preserves {
                rotations.push(w);
            }
        }

        rotations
    }

    fn maps_onto(
        &self,
        lattice: &Matrix3<f64>,
        positions: &[Vector3<f64>],
        elements: &[&str],
        w: &Matrix3<f64>,
        t: &Vector3<f64>,
    ) -> bool {
        positions.iter().zip(elements).all(|(pos, el)| {
            let image = w * pos + t;
            positions
                .iter()
                .zip(elements)
                .any(|(other, other_el)| {
                    other_el == el && (lattice * wrap(image - other)).norm() < self.symprec
                })
        })
    }
}

/// 分数差值折回 [-0.5, 0.5)
fn wrap(d: Vector3<f64>) -> Vector3<f64> {
    d.map(|x| x - x.round())
}
