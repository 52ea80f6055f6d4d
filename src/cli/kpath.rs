//! # kpath 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/kpath.rs`

use clap::Args;
use std::path::PathBuf;

/// kpath 子命令参数
#[derive(Args, Debug)]
pub struct KpathArgs {
    /// Slab POSCAR file
    pub poscar: PathBuf,

    /// Output KPATH file
    #[arg(default_value = "KPATH")]
    pub kpath: PathBuf,
}
