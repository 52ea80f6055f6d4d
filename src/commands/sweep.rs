//! # sweep 子命令实现
//!
//! 对同一体相结构按 晶面 × 最小厚度 构建 `SlabAggregate`，
//! 合并各自的汇总表并打印，可选保存为 CSV 并导出每项的首个终止面。
//! 体相结构经 `CachedProvider` 只获取一次。
//!
//! ## 导出文件
//! - `<basename>_<size>.vasp`: 笛卡尔坐标 POSCAR
//! - `<basename>_<size>.potcar`: 需要赝势库
//! - `<basename>_<size>.kpath`
//!
//! ## 依赖关系
//! - 使用 `cli/sweep.rs` 定义的参数
//! - 使用 `slab/`, `provider/`, `vasp/`, `batch/runner.rs`

use crate::batch::BatchRunner;
use crate::cli::sweep::SweepArgs;
use crate::error::{Result, SlabkitError};
use crate::models::MillerIndex;
use crate::parsers::poscar::CoordinateMode;
use crate::provider::{CachedProvider, FileProvider, MaterialsProject, StructureProvider};
use crate::slab::table::{concat_tables, render_table, save_csv};
use crate::slab::{SlabAggregate, TerminationSlabGenerator};
use crate::utils::{output, progress};
use crate::vasp::{EmitterSettings, InputFile};

use std::fs;
use std::path::Path;

/// 执行 sweep
pub fn execute(args: SweepArgs) -> Result<()> {
    output::print_header("Slab Sweep");

    let sizes = parse_sizes(&args.sizes)?;
    if args.planes.is_empty() {
        return Err(SlabkitError::InvalidArgument(
            "At least one plane is required".to_string(),
        ));
    }

    let (provider, id) = open_source(&args)?;

    let spinner = progress::create_spinner(&format!("Fetching {}...", id));
    let fetched = provider.fetch(&id);
    spinner.finish_and_clear();
    let bulk = fetched?;

    output::print_info(&format!(
        "Bulk {} ({} sites) from {}",
        bulk.reduced_formula(),
        bulk.num_sites(),
        bulk.source.as_deref().unwrap_or(&id)
    ));

    let items: Vec<(MillerIndex, f64)> = args
        .planes
        .iter()
        .flat_map(|plane| sizes.iter().map(move |&size| (*plane, size)))
        .collect();

    let generator = TerminationSlabGenerator::default();
    let emit = EmitterSettings {
        potcar_library: args.potcar_dir.clone(),
        coordinates: CoordinateMode::Cartesian,
        ..EmitterSettings::default()
    };

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!(
        "{} plane(s) x {} size(s) on {} threads",
        args.planes.len(),
        sizes.len(),
        runner.jobs()
    ));
    let results = runner.map(&items, "Cutting slabs", |(plane, size)| {
        SlabAggregate::from_material_id(&provider, &id, *plane, *size, &generator, &emit)
    })?;

    let mut aggregates: Vec<SlabAggregate> = Vec::new();
    let mut failures = Vec::new();
    for ((plane, size), result) in items.iter().zip(results) {
        match result {
            Ok(aggregate) => aggregates.push(aggregate),
            Err(e) => failures.push((format!("({}) min {}", plane, size), e.to_string())),
        }
    }

    for aggregate in &aggregates {
        let message = format!(
            "{} ({}) min {}: {} slab(s), bulk {}",
            aggregate.bulk().reduced_formula(),
            aggregate.plane(),
            aggregate.min_slab_size(),
            aggregate.slabs().len(),
            aggregate.symmetry()
        );
        if aggregate.is_symmetric() {
            output::print_success(&message);
        } else {
            output::print_warning(&format!("{} (asymmetric terminations)", message));
        }
    }

    let rows = concat_tables(aggregates.iter().map(SlabAggregate::to_table));
    if rows.is_empty() {
        output::print_warning("No slabs were generated");
    } else {
        println!("{}", render_table(&rows));
    }

    if let Some(csv_path) = &args.csv {
        save_csv(&rows, csv_path)?;
        output::print_success(&format!("Saved summary to '{}'", csv_path.display()));
    }

    if let Some(dir) = &args.export_dir {
        fs::create_dir_all(dir).map_err(|e| SlabkitError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;
        let mut warned = false;
        for aggregate in &aggregates {
            let missing_potcar = export_first_slab(aggregate, dir)?;
            if missing_potcar && !warned {
                output::print_warning("No POTCAR library configured, skipping .potcar files");
                warned = true;
            }
        }
        output::print_success(&format!(
            "Exported {} slab(s) to '{}'",
            aggregates.len(),
            dir.display()
        ));
    }

    output::print_separator();
    output::print_done(&format!(
        "{} entries, {} rows, {} failed",
        items.len(),
        rows.len(),
        failures.len()
    ));
    if !failures.is_empty() {
        output::print_warning("Failed entries:");
        for (entry, err) in failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", entry, err));
        }
        if failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", failures.len() - 10));
        }
    }

    Ok(())
}

/// 数据源与标识符：Materials Project 编号，或本地文件路径
fn open_source(args: &SweepArgs) -> Result<(CachedProvider, String)> {
    if let Some(id) = &args.mp_id {
        let api_key = args.api_key.clone().ok_or_else(|| {
            SlabkitError::InvalidArgument(
                "--api-key or MP_API_KEY is required with --mp-id".to_string(),
            )
        })?;
        let provider = CachedProvider::new(Box::new(MaterialsProject::new(api_key)));
        Ok((provider, id.clone()))
    } else if let Some(input) = &args.input {
        let provider = CachedProvider::new(Box::new(FileProvider));
        Ok((provider, input.to_string_lossy().into_owned()))
    } else {
        Err(SlabkitError::InvalidArgument(
            "Either --mp-id or --input is required".to_string(),
        ))
    }
}

/// 写出首个 slab 的 .vasp / .potcar / .kpath。
/// 返回 POTCAR 是否因缺少赝势库被跳过。
fn export_first_slab(aggregate: &SlabAggregate, dir: &Path) -> Result<bool> {
    let stem = format!("{}_{}", aggregate.basename(), aggregate.min_slab_size());

    if let Some(poscar) = aggregate.poscars().first() {
        poscar.write_file(&dir.join(format!("{}.vasp", stem)))?;
    }
    if let Some(kpath) = aggregate.kpaths().first() {
        kpath.write_file(&dir.join(format!("{}.kpath", stem)))?;
    }
    match aggregate.potcars().first() {
        Some(potcar) if potcar.library.is_some() => {
            potcar.write_file(&dir.join(format!("{}.potcar", stem)))?;
            Ok(false)
        }
        Some(_) => Ok(true),
        None => Ok(false),
    }
}

/// 单次扫描的厚度个数上限
const MAX_SIZES: usize = 1000;

/// 解析厚度列表：`start:stop:step`（不含 stop）或逗号分隔的数值
pub fn parse_sizes(text: &str) -> Result<Vec<f64>> {
    let invalid = || SlabkitError::InvalidRange(text.to_string());

    let sizes = if text.contains(':') {
        let parts: Vec<f64> = text
            .split(':')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| invalid())?;
        let (start, stop, step) = match parts.as_slice() {
            [start, stop] => (*start, *stop, 1.0),
            [start, stop, step] => (*start, *stop, *step),
            _ => return Err(invalid()),
        };
        if step <= 0.0 || stop <= start {
            return Err(invalid());
        }
        let count = ((stop - start) / step).ceil();
        if !count.is_finite() || count > MAX_SIZES as f64 {
            return Err(invalid());
        }
        let count = count as usize;
        (0..count).map(|i| start + i as f64 * step).collect()
    } else {
        text.split(',')
            .filter(|p| !p.trim().is_empty())
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| invalid())?
    };

    let out_of_range = sizes.iter().any(|s| !s.is_finite() || *s <= 0.0);
    if sizes.is_empty() || sizes.len() > MAX_SIZES || out_of_range {
        return Err(invalid());
    }
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sizes_range_excludes_stop() {
        assert_eq!(parse_sizes("5:30:5").unwrap(), vec![5.0, 10.0, 15.0, 20.0, 25.0]);
        assert_eq!(parse_sizes("1:4").unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_parse_sizes_list() {
        assert_eq!(parse_sizes("7.5, 10,20").unwrap(), vec![7.5, 10.0, 20.0]);
        assert_eq!(parse_sizes("12").unwrap(), vec![12.0]);
    }

    #[test]
    fn test_parse_sizes_invalid() {
        assert!(parse_sizes("").is_err());
        assert!(parse_sizes("5:30:0").is_err());
        assert!(parse_sizes("30:5:5").is_err());
        assert!(parse_sizes("a,b").is_err());
        assert!(parse_sizes("0,5").is_err());
        assert!(parse_sizes("1:2:3:4").is_err());
    }

    #[test]
    fn test_parse_sizes_range_is_bounded() {
        assert!(parse_sizes("1:1e15:1").is_err());
        assert!(parse_sizes("1:inf:1").is_err());
        assert_eq!(parse_sizes("1:1001:1").unwrap().len(), MAX_SIZES);
    }
}
