//! # Slab 生成器
//!
//! 沿 (hkl) 切割体相结构，为每个不等价的终止面生成一个 slab。
//!
//! ## 算法概述
//! 1. hkl 按最大公约数约化，求面内本原整数基 (u, v) 与堆叠矢量 w (hkl·w = 1)
//! 2. 把体相原子变换到 (u, v, w) 取向晶胞，z' = hkl·x 即为以 d_hkl 为单位的高度
//! 3. 按高度聚类成原子层，在每个层间空隙中点切割，得到一种终止面
//! 4. 堆叠 `ceil(min_slab / d)` 层原子与 `ceil(min_vacuum / d)` 层真空
//! 5. 晶格转正：a ∥ x, b 在 xy 面内, c ∥ z；原子按 z 从上到下排序
//! 6. 去掉层高剖面相同的终止面；要求对称时只保留上下对称的 slab
//!
//! ## 依赖关系
//! - 被 `slab/aggregate.rs`, `vasp/mod.rs` 使用
//! - 使用 `math/`, `symmetry/`, `models/`

use crate::error::{Result, SlabkitError};
use crate::math::integer_basis;
use crate::models::{Atom, Crystal, Lattice, MillerIndex};
use crate::symmetry::{self, SymmetryFinder};

use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};

/// 默认最小 slab 厚度 (Å)
pub const DEFAULT_MIN_SLAB_SIZE: f64 = 10.0;
pub const DEFAULT_MIN_VACUUM_SIZE: f64 = 10.0;

/// slab 与真空层合计的层数上限
pub const MAX_LAYERS: usize = 10_000;

/// slab 生成参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlabParameters {
    /// 最小 slab 厚度 (Å)，`in_unit_planes` 时为层数
    pub min_slab_size: f64,
    /// 最小真空层厚度 (Å)，`in_unit_planes` 时为层数
    pub min_vacuum_size: f64,
    pub in_unit_planes: bool,
    /// 只返回上下对称的 slab
    pub symmetric: bool,
    /// 原子层聚类与对称判断的容差 (Å)
    pub tolerance: f64,
}

impl Default for SlabParameters {
    fn default() -> Self {
        SlabParameters {
            min_slab_size: DEFAULT_MIN_SLAB_SIZE,
            min_vacuum_size: DEFAULT_MIN_VACUUM_SIZE,
            in_unit_planes: false,
            symmetric: true,
            tolerance: 0.1,
        }
    }
}

impl SlabParameters {
    pub fn with_symmetric(mut self, symmetric: bool) -> Self {
        self.symmetric = symmetric;
        self
    }
}

/// 按 Miller 面生成 slab 的能力
pub trait SlabGenerator: Send + Sync {
    /// 返回 slab 列表，每个 slab 的原子按表面法向从上到下排列。
    ///
    /// `params.symmetric` 为真但不存在对称终止面时返回
    /// `SlabkitError::SymmetricSlabInfeasible`。
    fn generate(
        &self,
        bulk: &Crystal,
        plane: &MillerIndex,
        params: &SlabParameters,
    ) -> Result<Vec<Crystal>>;
}

/// 取向晶胞：原子在 (u, v, w) 基下的分数坐标，以及 slab 几何量
struct OrientedCell {
    /// 面内基矢 A = L u, B = L v（笛卡尔）
    a: Vector3<f64>,
    b: Vector3<f64>,
    /// 堆叠矢量 w 的面内分量系数：C = pA + qB + C⊥
    in_plane: Vector2<f64>,
    /// 面间距 d_hkl (Å)
    d_spacing: f64,
    atoms: Vec<(String, Vector3<f64>)>,
}

/// 基于终止面枚举的 slab 生成器
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminationSlabGenerator;

impl TerminationSlabGenerator {
    fn orient(&self, bulk: &Crystal, n: Vector3<i32>) -> Result<OrientedCell> {
        let lattice = bulk.lattice.column_matrix();
        let inverse = lattice.try_inverse().ok_or_else(|| {
            SlabkitError::SlabGeneration(format!("degenerate lattice for {}", bulk.name))
        })?;

        let to_cart = |x: &Vector3<i32>| lattice * x.map(|c| c as f64);

        // 倒格矢 G = (L⁻¹)ᵀ n，|G| = 1 / d_hkl
        let g = inverse.transpose() * n.map(|c| c as f64);
        let d_spacing = 1.0 / g.norm();
        let normal = g.normalize();

        let (mut u, mut v) = integer_basis::find_primitive_in_plane_basis(n, to_cart)?;
        let w = integer_basis::find_stacking_vector(n, &normal, to_cart)?;

        if to_cart(&u).cross(&to_cart(&v)).dot(&to_cart(&w)) < 0.0 {
            std::mem::swap(&mut u, &mut v);
        }

        let basis = Matrix3::from_columns(&[u, v, w]).map(|c| c as f64);
        let basis_inv = basis.try_inverse().ok_or_else(|| {
            SlabkitError::SlabGeneration("oriented basis is singular".to_string())
        })?;

        let a = to_cart(&u);
        let b = to_cart(&v);
        let c = to_cart(&w);

        let gram = Matrix2::new(a.dot(&a), a.dot(&b), a.dot(&b), b.dot(&b));
        let in_plane = gram
            .try_inverse()
            .map(|inv| inv * Vector2::new(a.dot(&c), b.dot(&c)))
            .ok_or_else(|| SlabkitError::SlabGeneration("in-plane basis is degenerate".to_string()))?;

        let atoms = bulk
            .atoms
            .iter()
            .map(|atom| {
                let frac = basis_inv * Vector3::from(atom.position);
                (atom.element.clone(), frac.map(wrap_unit))
            })
            .collect();

        Ok(OrientedCell {
            a,
            b,
            in_plane,
            d_spacing,
            atoms,
        })
    }

    fn build_slab(
        &self,
        cell: &OrientedCell,
        shift: f64,
        n_slab: usize,
        n_total: usize,
        name: &str,
    ) -> Crystal {
        let len_a = cell.a.norm();
        let len_b = cell.b.norm();
        let cos_gamma = cell.a.dot(&cell.b) / (len_a * len_b);
        let sin_gamma = (1.0 - cos_gamma * cos_gamma).max(0.0).sqrt();

        let lattice = Lattice::from_vectors([
            [len_a, 0.0, 0.0],
            [len_b * cos_gamma, len_b * sin_gamma, 0.0],
            [0.0, 0.0, cell.d_spacing * n_total as f64],
        ]);

        let (p, q) = (cell.in_plane.x, cell.in_plane.y);
        let mut atoms: Vec<Atom> = Vec::with_capacity(cell.atoms.len() * n_slab);
        for layer in 0..n_slab {
            for (element, frac) in &cell.atoms {
                let t = (frac.z - shift).rem_euclid(1.0) + layer as f64;
                let position = [
                    wrap_unit(frac.x + p * t),
                    wrap_unit(frac.y + q * t),
                    t / n_total as f64,
                ];
                atoms.push(Atom::new(element.clone(), position));
            }
        }

        atoms.sort_by(|x, y| y.position[2].total_cmp(&x.position[2]));
        Crystal::new(name, lattice, atoms)
    }
}

impl SlabGenerator for TerminationSlabGenerator {
    fn generate(
        &self,
        bulk: &Crystal,
        plane: &MillerIndex,
        params: &SlabParameters,
    ) -> Result<Vec<Crystal>> {
        if bulk.atoms.is_empty() {
            return Err(SlabkitError::SlabGeneration(format!(
                "bulk structure {} has no sites",
                bulk.name
            )));
        }
        let sizes_valid = params.min_slab_size.is_finite()
            && params.min_vacuum_size.is_finite()
            && params.min_slab_size > 0.0
            && params.min_vacuum_size >= 0.0;
        if !sizes_valid {
            return Err(SlabkitError::InvalidArgument(format!(
                "slab size {} / vacuum size {} out of range",
                params.min_slab_size, params.min_vacuum_size
            )));
        }

        let reduced = plane.reduced()?;
        let cell = self.orient(bulk, Vector3::from(reduced.0))?;

        let (n_slab, n_vacuum) = if params.in_unit_planes {
            (params.min_slab_size.ceil(), params.min_vacuum_size.ceil())
        } else {
            (
                (params.min_slab_size / cell.d_spacing).ceil(),
                (params.min_vacuum_size / cell.d_spacing).ceil(),
            )
        };
        if n_slab + n_vacuum > MAX_LAYERS as f64 {
            return Err(SlabkitError::InvalidArgument(format!(
                "slab size {} / vacuum size {} needs more than {} layers",
                params.min_slab_size, params.min_vacuum_size, MAX_LAYERS
            )));
        }
        let n_slab = (n_slab as usize).max(1);
        let n_total = n_slab + n_vacuum as usize;

        let heights: Vec<f64> = cell.atoms.iter().map(|(_, f)| f.z).collect();
        let shifts = termination_shifts(&heights, params.tolerance / cell.d_spacing);

        let name = format!("{} ({})", bulk.reduced_formula(), plane);
        let mut slabs: Vec<Crystal> = Vec::new();
        for shift in shifts {
            let slab = self.build_slab(&cell, shift, n_slab, n_total, &name);
            if !slabs
                .iter()
                .any(|existing| same_layer_profile(existing, &slab, params.tolerance))
            {
                slabs.push(slab);
            }
        }

        if params.symmetric {
            let finder = SymmetryFinder::new(params.tolerance);
            slabs.retain(|slab| symmetry::is_symmetric_slab(slab, &finder));
            if slabs.is_empty() {
                return Err(SlabkitError::SymmetricSlabInfeasible {
                    plane: plane.label(),
                    min_slab_size: params.min_slab_size,
                });
            }
        }

        Ok(slabs)
    }
}

/// 折回 [0, 1)，并把 1 - ε 视为 0
fn wrap_unit(x: f64) -> f64 {
    let w = x.rem_euclid(1.0);
    if (1.0 - w) < 1e-8 {
        0.0
    } else {
        w
    }
}

/// 原子层间空隙的中点（分数高度），每个对应一种终止面
pub(crate) fn termination_shifts(heights: &[f64], tolerance: f64) -> Vec<f64> {
    let mut sorted: Vec<f64> = heights.to_vec();
    sorted.sort_by(f64::total_cmp);

    // (最低, 最高) 的层区间
    let mut layers: Vec<(f64, f64)> = Vec::new();
    for z in sorted {
        match layers.last_mut() {
            Some(layer) if z - layer.1 < tolerance => layer.1 = z,
            _ => layers.push((z, z)),
        }
    }

    // 跨越周期边界的首尾两层合并
    if layers.len() > 1 {
        let first = layers[0];
        let last = layers[layers.len() - 1];
        if first.0 + 1.0 - last.1 < tolerance {
            layers.pop();
            layers[0] = (last.0 - 1.0, first.1);
        }
    }

    let count = layers.len();
    (0..count)
        .map(|i| {
            let next_low = if i + 1 < count {
                layers[i + 1].0
            } else {
                layers[0].0 + 1.0
            };
            ((layers[i].1 + next_low) / 2.0).rem_euclid(1.0)
        })
        .collect()
}

/// 两个 slab 的 (元素, 距底面高度) 剖面在容差内一致
fn same_layer_profile(a: &Crystal, b: &Crystal, tolerance: f64) -> bool {
    fn profile(slab: &Crystal) -> Vec<(i64, String)> {
        let c = slab.lattice.matrix[2][2];
        let bottom = slab
            .atoms
            .iter()
            .map(|x| x.position[2])
            .fold(f64::INFINITY, f64::min);
        let mut rows: Vec<(i64, String)> = slab
            .atoms
            .iter()
            .map(|x| (((x.position[2] - bottom) * c * 1000.0).round() as i64, x.element.clone()))
            .collect();
        rows.sort();
        rows
    }

    if a.num_sites() != b.num_sites() {
        return false;
    }
    let tol_milli = (tolerance * 1000.0).round() as i64;
    profile(a)
        .iter()
        .zip(profile(b).iter())
        .all(|((ha, ea), (hb, eb))| ea == eb && (ha - hb).abs() <= tol_milli)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_cubic() -> Crystal {
        let lattice = Lattice::from_parameters(3.0, 3.0, 3.0, 90.0, 90.0, 90.0);
        Crystal::new("Po", lattice, vec![Atom::new("Po", [0.0, 0.0, 0.0])])
    }

    fn layered_ab() -> Crystal {
        let lattice = Lattice::from_parameters(3.0, 3.0, 4.0, 90.0, 90.0, 90.0);
        Crystal::new(
            "NaCl",
            lattice,
            vec![
                Atom::new("Na", [0.0, 0.0, 0.0]),
                Atom::new("Cl", [0.5, 0.5, 0.5]),
            ],
        )
    }

    #[test]
    fn test_simple_cubic_001_geometry() {
        let params = SlabParameters::default();
        let slabs = TerminationSlabGenerator::default()
            .generate(&simple_cubic(), &MillerIndex::new(0, 0, 1), &params)
            .unwrap();

        assert_eq!(slabs.len(), 1);
        let slab = &slabs[0];
        assert_eq!(slab.num_sites(), 4);
        assert!((slab.lattice.abc()[2] - 24.0).abs() < 1e-9);

        let z: Vec<f64> = (0..4).map(|i| slab.cart_coords(i).unwrap()[2]).collect();
        let expected = [10.5, 7.5, 4.5, 1.5];
        for (got, want) in z.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-9, "z = {:?}", z);
        }
    }

    #[test]
    fn test_lattice_is_reoriented() {
        let slabs = TerminationSlabGenerator::default()
            .generate(&simple_cubic(), &MillerIndex::new(1, 1, 1), &SlabParameters::default())
            .unwrap();
        let m = slabs[0].lattice.matrix;
        assert!(m[0][1].abs() < 1e-12 && m[0][2].abs() < 1e-12);
        assert!(m[1][2].abs() < 1e-12);
        assert!(m[2][0].abs() < 1e-12 && m[2][1].abs() < 1e-12);
        assert!(slabs[0].lattice.volume() > 0.0);
    }

    #[test]
    fn test_sites_ordered_top_to_bottom() {
        let slabs = TerminationSlabGenerator::default()
            .generate(&simple_cubic(), &MillerIndex::new(1, 1, 0), &SlabParameters::default())
            .unwrap();
        for slab in &slabs {
            let z: Vec<f64> = slab.atoms.iter().map(|a| a.position[2]).collect();
            assert!(z.windows(2).all(|w| w[0] >= w[1]));
        }
    }

    #[test]
    fn test_alternating_layers_cannot_be_symmetric() {
        let generator = TerminationSlabGenerator::default();
        let plane = MillerIndex::new(0, 0, 1);
        let params = SlabParameters::default();

        match generator.generate(&layered_ab(), &plane, &params) {
            Err(SlabkitError::SymmetricSlabInfeasible { plane, .. }) => assert_eq!(plane, "001"),
            other => panic!("expected infeasible, got {:?}", other.map(|s| s.len())),
        }

        let slabs = generator
            .generate(&layered_ab(), &plane, &params.with_symmetric(false))
            .unwrap();
        assert_eq!(slabs.len(), 2);
        let tops: Vec<&str> = slabs.iter().map(|s| s.atoms[0].element.as_str()).collect();
        assert!(tops.contains(&"Na") && tops.contains(&"Cl"));
    }

    #[test]
    fn test_in_unit_planes_counts_layers() {
        let params = SlabParameters {
            min_slab_size: 3.0,
            min_vacuum_size: 2.0,
            in_unit_planes: true,
            ..SlabParameters::default()
        };
        let slabs = TerminationSlabGenerator::default()
            .generate(&simple_cubic(), &MillerIndex::new(0, 0, 1), &params)
            .unwrap();
        assert_eq!(slabs[0].num_sites(), 3);
        assert!((slabs[0].lattice.abc()[2] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_plane_rejected() {
        let result = TerminationSlabGenerator::default().generate(
            &simple_cubic(),
            &MillerIndex::new(0, 0, 0),
            &SlabParameters::default(),
        );
        assert!(matches!(result, Err(SlabkitError::InvalidPlane(_))));
    }

    #[test]
    fn test_non_finite_sizes_rejected() {
        let generator = TerminationSlabGenerator::default();
        let plane = MillerIndex::new(0, 0, 1);
        let cases = [
            (f64::NAN, 10.0),
            (f64::INFINITY, 10.0),
            (10.0, f64::NAN),
            (10.0, f64::INFINITY),
        ];
        for (slab, vacuum) in cases {
            let params = SlabParameters {
                min_slab_size: slab,
                min_vacuum_size: vacuum,
                ..SlabParameters::default()
            };
            assert!(
                matches!(
                    generator.generate(&simple_cubic(), &plane, &params),
                    Err(SlabkitError::InvalidArgument(_))
                ),
                "slab {} vacuum {}",
                slab,
                vacuum
            );
        }
    }

    #[test]
    fn test_layer_count_is_bounded() {
        let params = SlabParameters {
            min_slab_size: 1e12,
            ..SlabParameters::default()
        };
        let result = TerminationSlabGenerator::default().generate(
            &simple_cubic(),
            &MillerIndex::new(0, 0, 1),
            &params,
        );
        assert!(matches!(result, Err(SlabkitError::InvalidArgument(_))));
    }

    #[test]
    fn test_termination_shifts_wrap_around() {
        let shifts = termination_shifts(&[0.0, 0.999, 0.5], 0.01);
        assert_eq!(shifts.len(), 2);
        assert!(shifts.iter().any(|s| (s - 0.25).abs() < 1e-3));
        assert!(shifts.iter().any(|s| (s - 0.7495).abs() < 1e-3));
    }
}
