//! # sweep 子命令 CLI 定义
//!
//! 对同一体相结构按 晶面 × 最小厚度 批量生成 slab 汇总。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/sweep.rs`

use super::parse_plane;
use crate::models::MillerIndex;

use clap::{ArgGroup, Args};
use std::path::PathBuf;

/// sweep 子命令参数
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["mp_id", "input"])))]
pub struct SweepArgs {
    /// Materials Project identifier of the bulk structure
    #[arg(short, long)]
    pub mp_id: Option<String>,

    /// Local bulk structure file
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Materials Project API key (with --mp-id)
    #[arg(long, env = "MP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Miller planes, comma separated
    ///
    /// Indices refer to the input cell. A primitive cell (as Materials Project
    /// often returns) gives different faces than the conventional cell.
    #[arg(long, value_delimiter = ',', value_parser = parse_plane, default_value = "111,001")]
    pub planes: Vec<MillerIndex>,

    /// Minimum slab sizes: "start:stop:step" (stop excluded) or "5,10,15"
    #[arg(long, default_value = "5:30:5")]
    pub sizes: String,

    /// Save the summary table as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Write <basename>_<size>.vasp/.potcar/.kpath for the first slab of each entry
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// PAW pseudopotential library used for exported POTCARs
    #[arg(long, env = "VASP_PSP_DIR")]
    pub potcar_dir: Option<PathBuf>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}
