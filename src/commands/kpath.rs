//! # kpath 子命令实现
//!
//! ## 依赖关系
//! - 使用 `cli/kpath.rs` 定义的参数
//! - 使用 `vasp/kpath.rs`

use crate::cli::kpath::KpathArgs;
use crate::error::{Result, SlabkitError};
use crate::utils::output;
use crate::vasp;

/// 执行 kpath
pub fn execute(args: KpathArgs) -> Result<()> {
    if !args.poscar.is_file() {
        return Err(SlabkitError::FileNotFound {
            path: args.poscar.display().to_string(),
        });
    }

    let kpath = vasp::make_kpath(&args.poscar, &args.kpath)?;
    output::print_derived(
        &args.poscar.display().to_string(),
        &format!("{} ({} lattice)", args.kpath.display(), kpath.lattice),
    );

    Ok(())
}
