//! # generate 子命令实现
//!
//! 从 Materials Project 获取体相结构，切 slab 并写出 VASP 输入。
//!
//! ## 依赖关系
//! - 使用 `cli/generate.rs` 定义的参数
//! - 使用 `provider/materials_project.rs`, `vasp/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::cli::generate::GenerateArgs;
use crate::error::Result;
use crate::provider::MaterialsProject;
use crate::utils::{output, progress};
use crate::vasp;

/// 执行 generate
pub fn execute(args: GenerateArgs) -> Result<()> {
    output::print_header("Generating Slab Inputs");
    output::print_info(&format!(
        "Material {} | plane ({}) | min slab {} | min vacuum {}",
        args.mp_id, args.plane, args.slab.min_slab_size, args.slab.min_vacuum_size
    ));

    let provider = MaterialsProject::new(args.api_key.clone());
    let options = args.slab.to_options();

    let spinner = progress::create_spinner("Fetching structure and cutting slabs...");
    let result =
        vasp::write_inputs_for_material(&provider, &args.mp_id, &args.plane, &options, &args.output);
    spinner.finish_and_clear();

    let job_dirs = result?;
    for dir in &job_dirs {
        output::print_success(&format!("Wrote inputs to '{}'", dir.display()));
    }
    output::print_done(&format!(
        "{} slab(s) for {} ({})",
        job_dirs.len(),
        args.mp_id,
        args.plane.label()
    ));

    Ok(())
}
