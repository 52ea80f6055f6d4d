//! # 整数格矢搜索
//!
//! 为给定的 (hkl) 寻找面内本原整数基 (u, v) 以及堆叠矢量 w。
//!
//! ## 依赖关系
//! - 被 `slab/generator.rs` 使用
//! - 使用 `math/lll.rs` 的二维约化

use crate::error::{Result, SlabkitError};
use crate::math::lll;

use nalgebra::Vector3;

/// 搜索半径：|分量| <= max(|h|,|k|,|l|) + 1
fn search_radius(n: &Vector3<i32>) -> i32 {
    n.x.abs().max(n.y.abs()).max(n.z.abs()) + 1
}

fn candidates(radius: i32) -> impl Iterator<Item = Vector3<i32>> {
    (-radius..=radius).flat_map(move |x| {
        (-radius..=radius)
            .flat_map(move |y| (-radius..=radius).map(move |z| Vector3::new(x, y, z)))
    })
}

/// 寻找张成 (hkl) 面内二维格子的本原整数基。
///
/// `n` 必须已约化（gcd = 1）。本原条件为 u × v = ±n。
/// `to_cart` 把整数指数向量映射为笛卡尔向量，用于选取最短的一组。
pub fn find_primitive_in_plane_basis<F>(n: Vector3<i32>, to_cart: F) -> Result<(Vector3<i32>, Vector3<i32>)>
where
    F: Fn(&Vector3<i32>) -> Vector3<f64>,
{
    if n == Vector3::zeros() {
        return Err(SlabkitError::InvalidPlane(
            "Miller indices cannot be (0 0 0)".to_string(),
        ));
    }

    let mut in_plane: Vec<(f64, Vector3<i32>)> = candidates(search_radius(&n))
        .filter(|w| *w != Vector3::zeros() && w.dot(&n) == 0)
        .map(|w| (to_cart(&w).norm(), w))
        .collect();
    in_plane.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut best: Option<(f64, Vector3<i32>, Vector3<i32>)> = None;
    for (i, (len_u, u)) in in_plane.iter().enumerate() {
        for (len_v, v) in in_plane.iter().skip(i + 1) {
            let cross = u.cross(v);
            if cross == n || cross == -n {
                let score = len_u + len_v;
                if best.map_or(true, |(s, _, _)| score < s - 1e-9) {
                    best = Some((score, *u, *v));
                }
                break;
            }
        }
    }

    let (_, u, v) = best.ok_or_else(|| {
        SlabkitError::SlabGeneration(format!(
            "no primitive in-plane basis found for ({} {} {})",
            n.x, n.y, n.z
        ))
    })?;

    Ok(lll::reduce_2d_integer(u, v, to_cart))
}

/// 寻找满足 n·w = 1 的堆叠矢量，取与表面法向夹角最小者（相同时取最短）。
///
/// `normal` 为笛卡尔单位法向。
pub fn find_stacking_vector<F>(n: Vector3<i32>, normal: &Vector3<f64>, to_cart: F) -> Result<Vector3<i32>>
where
    F: Fn(&Vector3<i32>) -> Vector3<f64>,
{
    let mut best: Option<(f64, f64, Vector3<i32>)> = None;

    for w in candidates(search_radius(&n)).filter(|w| w.dot(&n) == 1) {
        let cart = to_cart(&w);
        let len = cart.norm();
        if len < 1e-9 {
            continue;
        }
        let cos = (cart.dot(normal) / len).abs();
        let better = match best {
            None => true,
            Some((best_cos, best_len, _)) => {
                cos > best_cos + 1e-6 || ((cos - best_cos).abs() <= 1e-6 && len < best_len)
            }
        };
        if better {
            best = Some((cos, len, w));
        }
    }

    best.map(|(_, _, w)| w).ok_or_else(|| {
        SlabkitError::SlabGeneration(format!(
            "no stacking vector found for ({} {} {})",
            n.x, n.y, n.z
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(x: &Vector3<i32>) -> Vector3<f64> {
        Vector3::new(x.x as f64, x.y as f64, x.z as f64)
    }

    #[test]
    fn test_in_plane_basis_001() {
        let n = Vector3::new(0, 0, 1);
        let (u, v) = find_primitive_in_plane_basis(n, cubic).unwrap();
        assert_eq!(u.dot(&n), 0);
        assert_eq!(v.dot(&n), 0);
        let cross = u.cross(&v);
        assert!(cross == n || cross == -n);
        assert!((cubic(&u).norm() - 1.0).abs() < 1e-12);
        assert!((cubic(&v).norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_in_plane_basis_111_is_primitive() {
        let n = Vector3::new(1, 1, 1);
        let (u, v) = find_primitive_in_plane_basis(n, cubic).unwrap();
        let cross = u.cross(&v);
        assert!(cross == n || cross == -n);
        assert!((cubic(&u).norm() - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_stacking_vector_perpendicular_for_cubic_001() {
        let n = Vector3::new(0, 0, 1);
        let w = find_stacking_vector(n, &Vector3::new(0.0, 0.0, 1.0), cubic).unwrap();
        assert_eq!(w, Vector3::new(0, 0, 1));
    }

    #[test]
    fn test_stacking_vector_satisfies_index_condition() {
        let n = Vector3::new(1, 1, 0);
        let normal = Vector3::new(1.0, 1.0, 0.0).normalize();
        let w = find_stacking_vector(n, &normal, cubic).unwrap();
        assert_eq!(w.dot(&n), 1);
    }

    #[test]
    fn test_zero_plane_rejected() {
        assert!(find_primitive_in_plane_basis(Vector3::zeros(), cubic).is_err());
    }
}
