//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `slab/`, `vasp/`, `provider/`, `utils/`
//! - 子模块: generate, local, sweep, kpath

pub mod generate;
pub mod kpath;
pub mod local;
pub mod sweep;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Generate(args) => generate::execute(args),
        Commands::Local(args) => local::execute(args),
        Commands::Sweep(args) => sweep::execute(args),
        Commands::Kpath(args) => kpath::execute(args),
    }
}
