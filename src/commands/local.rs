//! # local 子命令实现
//!
//! 对本地体相结构文件切 slab 并写出 VASP 输入。
//!
//! ## 功能
//! - 单文件模式：输入写入 `--output`
//! - 目录模式：每个结构写入 `<output>/<文件名>_<晶面>/`，并行处理
//!
//! ## 依赖关系
//! - 使用 `cli/local.rs` 定义的参数
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `parsers/`, `vasp/`

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::local::LocalArgs;
use crate::error::{Result, SlabkitError};
use crate::models::MillerIndex;
use crate::parsers;
use crate::utils::output;
use crate::vasp::{self, SlabInputOptions};

use std::path::{Path, PathBuf};

/// 执行 local
pub fn execute(args: LocalArgs) -> Result<()> {
    output::print_header("Generating Slab Inputs From Local Structures");

    if args.input.is_file() {
        execute_single_file(&args)
    } else if args.input.is_dir() {
        execute_batch(&args)
    } else {
        Err(SlabkitError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

fn execute_single_file(args: &LocalArgs) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let options = args.slab.to_options();
    let dirs = process_structure(&args.input, &args.plane, &options, &args.output)?;
    for dir in &dirs {
        output::print_success(&format!("Wrote inputs to '{}'", dir.display()));
    }
    Ok(())
}

fn execute_batch(args: &LocalArgs) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)
        .recursive(args.recursive)
        .collect()?;

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }
    let options = args.slab.to_options();
    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!(
        "Found {} structure files, using {} threads",
        files.len(),
        runner.jobs()
    ));
    let result = runner.run(&files, |file| {
        let job_dir = args.output.join(job_dir_name(file, &args.plane));
        if job_dir.exists() && !args.overwrite {
            return ProcessResult::Skipped(format!(
                "Output exists, skipping: {}",
                job_dir.display()
            ));
        }
        match process_structure(file, &args.plane, &options, &job_dir) {
            Ok(dirs) => ProcessResult::Success(format!(
                "{} -> {} slab(s)",
                file.display(),
                dirs.len()
            )),
            Err(e) => ProcessResult::Failed(file.display().to_string(), e.to_string()),
        }
    })?;

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} processed ({} success, {} skipped, {} failed)",
        result.total(),
        result.success,
        result.skipped,
        result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    Ok(())
}

/// 目录模式下每个结构的输出子目录名
fn job_dir_name(file: &Path, plane: &MillerIndex) -> String {
    let stem = file
        .file_name()
        .and_then(|s| s.to_str())
        .map(|name| match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        })
        .unwrap_or("structure");
    format!("{}_{}", stem, plane.label())
}

fn process_structure(
    input: &Path,
    plane: &MillerIndex,
    options: &SlabInputOptions,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let bulk = parsers::parse_structure_file(input)?;
    vasp::write_inputs_for_structure(&bulk, plane, options, output_dir)
}
