//! # 数据模型模块
//!
//! 定义统一的晶体结构、成分与 Miller 指数数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `provider/`, `slab/`, `vasp/`, `commands/` 使用
//! - 子模块: structure, composition, elements, miller

pub mod composition;
pub mod elements;
pub mod miller;
pub mod structure;

pub use composition::Composition;
pub use miller::MillerIndex;
pub use structure::{Atom, Crystal, Lattice};
