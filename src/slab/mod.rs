//! # Slab 模块
//!
//! slab 生成、按晶面汇总与汇总表。
//!
//! ## 依赖关系
//! - 被 `vasp/`, `commands/` 使用
//! - 子模块: generator, aggregate, table

pub mod aggregate;
pub mod generator;
pub mod table;

pub use aggregate::SlabAggregate;
pub use generator::{SlabGenerator, SlabParameters, TerminationSlabGenerator};
pub use table::SummaryRow;
