//! # 格基约化
//!
//! LLL 约化（浮点，三维）与二维 Lagrange-Gauss 约化（带整数系数追踪）。
//!
//! ## 依赖关系
//! - 被 `symmetry/finder.rs` 使用（对称操作搜索前约化晶格）
//! - 被 `slab/generator.rs` 使用（约化面内基矢）

use nalgebra::{Matrix3, Vector3};

/// 对列向量基 (a, b, c) 做 LLL 约化，返回约化后的基
pub fn lll_reduce(basis: Matrix3<f64>) -> Matrix3<f64> {
    let delta = 0.75;
    let mut b = basis;
    let n = 3;
    let mut k = 1;
    let mut guard = 0;

    while k < n && guard < 1000 {
        guard += 1;
        let b_star = gram_schmidt(&b);

        for j in (0..k).rev() {
            let mu = b.column(k).dot(&b_star.column(j)) / b_star.column(j).norm_squared();
            if mu.abs() > 0.5 {
                let col_k = b.column(k) - b.column(j) * mu.round();
                b.set_column(k, &col_k);
            }
        }

        let b_star = gram_schmidt(&b);
        let mu_k_km1 =
            b.column(k).dot(&b_star.column(k - 1)) / b_star.column(k - 1).norm_squared();
        let lovasz = b_star.column(k).norm_squared()
            >= (delta - mu_k_km1.powi(2)) * b_star.column(k - 1).norm_squared();

        if lovasz {
            k += 1;
        } else {
            b.swap_columns(k, k - 1);
            k = 1.max(k - 1);
        }
    }
    b
}

fn gram_schmidt(b: &Matrix3<f64>) -> Matrix3<f64> {
    let mut b_star = *b;
    for i in 0..3 {
        let mut col_i = b.column(i).into_owned();
        for j in 0..i {
            let bj = b_star.column(j).into_owned();
            let mu = b.column(i).dot(&bj) / bj.norm_squared();
            col_i -= bj * mu;
        }
        b_star.set_column(i, &col_i);
    }
    b_star
}

/// 二维 Lagrange-Gauss 约化。
///
/// `u`, `v` 为整数指数向量，`metric` 把整数向量映射到笛卡尔向量。
/// 只做幺模变换，因此约化前后张成同一个二维格子。
pub fn reduce_2d_integer<F>(mut u: Vector3<i32>, mut v: Vector3<i32>, metric: F) -> (Vector3<i32>, Vector3<i32>)
where
    F: Fn(&Vector3<i32>) -> Vector3<f64>,
{
    let len2 = |x: &Vector3<i32>| metric(x).norm_squared();

    if len2(&u) > len2(&v) {
        std::mem::swap(&mut u, &mut v);
    }

    loop {
        let norm_sq = len2(&u);
        if norm_sq < 1e-12 {
            return (u, v);
        }

        let mu = (metric(&u).dot(&metric(&v)) / norm_sq).round() as i32;
        if mu == 0 {
            return (u, v);
        }

        let v_new = v - u * mu;
        if len2(&v_new) >= len2(&v) {
            return (u, v);
        }
        v = v_new;

        if len2(&u) > len2(&v) {
            std::mem::swap(&mut u, &mut v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lll_reduces_skewed_cubic_basis() {
        // a, a+b, a+b+c 的立方晶格应约化回三条 1.0 长的基矢
        let basis = Matrix3::new(1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0);
        let reduced = lll_reduce(basis);
        for i in 0..3 {
            assert!((reduced.column(i).norm() - 1.0).abs() < 1e-9);
        }
        assert!((reduced.determinant().abs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_reduce_2d_integer_square() {
        let metric = |x: &Vector3<i32>| Vector3::new(x.x as f64, x.y as f64, x.z as f64);
        let (u, v) = reduce_2d_integer(Vector3::new(1, 0, 0), Vector3::new(3, 1, 0), metric);
        assert_eq!(u, Vector3::new(1, 0, 0));
        assert_eq!(v, Vector3::new(0, 1, 0));
    }
}
