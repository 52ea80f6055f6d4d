//! # 数学工具模块
//!
//! 格基约化与整数格矢搜索。
//!
//! ## 依赖关系
//! - 被 `slab/`, `symmetry/` 使用
//! - 子模块: lll, integer_basis

pub mod integer_basis;
pub mod lll;
