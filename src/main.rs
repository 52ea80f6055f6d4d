//! # Slabkit - 体相晶体到 VASP slab 输入
//!
//! 从 Materials Project 或本地文件读取体相结构，沿给定晶面切出 slab，
//! 写出 POSCAR / POTCAR / KPATH（以及 INCAR / KPOINTS），并汇总各终止面信息。
//!
//! ## 子命令
//! - `generate` - 按 Materials Project 编号生成一套 slab 输入
//! - `local`    - 对本地结构文件或目录生成 slab 输入
//! - `sweep`    - 多晶面 × 多厚度汇总表，可导出 CSV 与首个终止面
//! - `kpath`    - 由 slab POSCAR 生成能带 k 点路径
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── provider/  (结构数据源)
//!   │     ├── slab/      (切 slab 与汇总)
//!   │     ├── vasp/      (输入文件)
//!   │     └── batch/     (并行批处理)
//!   ├── symmetry/   (对称操作与点群)
//!   ├── math/       (格约化与整数基)
//!   ├── parsers/    (格式解析器)
//!   ├── models/     (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod math;
mod models;
mod parsers;
mod provider;
mod slab;
mod symmetry;
mod utils;
mod vasp;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
