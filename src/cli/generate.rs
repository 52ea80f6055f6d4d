//! # generate 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/generate.rs`

use super::{parse_plane, SlabOptionArgs};
use crate::models::MillerIndex;

use clap::Args;
use std::path::PathBuf;

/// generate 子命令参数
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Materials Project identifier (e.g. mp-541837)
    #[arg(short, long)]
    pub mp_id: String,

    /// Miller plane, e.g. 111, 001, -110 or "1,1,1"
    ///
    /// Indices refer to the input cell. A primitive cell (as Materials Project
    /// often returns) gives different faces than the conventional cell.
    #[arg(short, long, value_parser = parse_plane)]
    pub plane: MillerIndex,

    /// Materials Project API key
    #[arg(long, env = "MP_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    #[command(flatten)]
    pub slab: SlabOptionArgs,
}
