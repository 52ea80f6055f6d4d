//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `generate`: 从 Materials Project 获取结构并写出 slab 输入
//! - `local`: 对本地结构文件（或目录）写出 slab 输入
//! - `sweep`: 多晶面 × 多厚度汇总表，可导出首个终止面
//! - `kpath`: 由 POSCAR 生成 slab 能带 k 点路径
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: generate, local, sweep, kpath

pub mod generate;
pub mod kpath;
pub mod local;
pub mod sweep;

use crate::models::MillerIndex;
use crate::vasp::{JobType, SlabInputOptions};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Slabkit - 体相结构到 VASP slab 输入
#[derive(Parser)]
#[command(name = "slabkit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Cut bulk crystals into slabs and write VASP inputs", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a bulk structure from Materials Project and write slab inputs
    Generate(generate::GenerateArgs),

    /// Write slab inputs for local structure files (.cif, .json, POSCAR)
    Local(local::LocalArgs),

    /// Tabulate slabs over several planes and thicknesses
    Sweep(sweep::SweepArgs),

    /// Derive a line-mode k-point path from a slab POSCAR
    Kpath(kpath::KpathArgs),
}

/// 解析 Miller 指数参数
pub fn parse_plane(s: &str) -> Result<MillerIndex, String> {
    s.parse::<MillerIndex>().map_err(|e| e.to_string())
}

/// slab 生成与输入文件的公共参数
#[derive(Args, Debug, Clone)]
pub struct SlabOptionArgs {
    /// Minimum slab thickness (Å, or planes with --in-unit-planes)
    #[arg(long, default_value_t = 15.0)]
    pub min_slab_size: f64,

    /// Minimum vacuum thickness (Å, or planes with --in-unit-planes)
    #[arg(long, default_value_t = 15.0)]
    pub min_vacuum_size: f64,

    /// Interpret sizes as numbers of (hkl) planes
    #[arg(long, default_value_t = false)]
    pub in_unit_planes: bool,

    /// Accept slabs whose top and bottom surfaces differ
    #[arg(long, default_value_t = false)]
    pub allow_asymmetric: bool,

    /// VASP job type for INCAR
    #[arg(long, value_enum, default_value_t = JobType::SlabRelaxationMedPrec)]
    pub job: JobType,

    /// PAW pseudopotential library (POTCAR is skipped when unset)
    #[arg(long, env = "VASP_PSP_DIR")]
    pub potcar_dir: Option<PathBuf>,
}

impl SlabOptionArgs {
    pub fn to_options(&self) -> SlabInputOptions {
        SlabInputOptions {
            min_slab_size: self.min_slab_size,
            min_vacuum_size: self.min_vacuum_size,
            in_unit_planes: self.in_unit_planes,
            ensure_symmetric: !self.allow_asymmetric,
            job: self.job,
            potcar_library: self.potcar_dir.clone(),
        }
    }
}
