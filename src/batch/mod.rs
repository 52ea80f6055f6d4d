//! # 批量处理模块
//!
//! 目录输入的文件收集与并行执行。
//!
//! ## 依赖关系
//! - 被 `commands/local.rs`, `commands/sweep.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::{FileCollector, DEFAULT_STRUCTURE_PATTERN};
pub use runner::{BatchResult, BatchRunner, ProcessResult};
