//! # local 子命令 CLI 定义
//!
//! 对本地体相结构文件写出 slab 输入，支持目录批量模式。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/local.rs`

use super::{parse_plane, SlabOptionArgs};
use crate::batch::DEFAULT_STRUCTURE_PATTERN;
use crate::models::MillerIndex;

use clap::Args;
use std::path::PathBuf;

/// local 子命令参数
#[derive(Args, Debug)]
pub struct LocalArgs {
    /// Structure file or directory of structure files
    #[arg(short, long)]
    pub input: PathBuf,

    /// Miller plane, e.g. 111, 001, -110 or "1,1,1"
    ///
    /// Indices refer to the input cell. A primitive cell (as Materials Project
    /// often returns) gives different faces than the conventional cell.
    #[arg(short, long, value_parser = parse_plane)]
    pub plane: MillerIndex,

    /// Output directory (one subdirectory per structure in directory mode)
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Glob pattern(s) for input files, comma separated
    #[arg(long, default_value = DEFAULT_STRUCTURE_PATTERN)]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Overwrite existing output directories
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    #[command(flatten)]
    pub slab: SlabOptionArgs,
}
