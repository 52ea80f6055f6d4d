//! # VASP 输入文件模块
//!
//! POSCAR / POTCAR / KPATH / INCAR / KPOINTS 的生成与写出，
//! 以及"切 slab → 写一套输入"的入口函数。
//!
//! ## 依赖关系
//! - 被 `slab/aggregate.rs`, `commands/` 使用
//! - 子模块: poscar, potcar, kpath, incar, kpoints
//! - 使用 `slab/generator.rs`, `provider/`

pub mod incar;
pub mod kpath;
pub mod kpoints;
pub mod poscar;
pub mod potcar;

pub use incar::{Incar, JobType};
pub use kpath::{make_kpath, KpathFile};
pub use kpoints::Kpoints;
pub use poscar::Poscar;
pub use potcar::Potcar;

use crate::error::{Result, SlabkitError};
use crate::models::{Crystal, MillerIndex};
use crate::parsers::poscar::CoordinateMode;
use crate::provider::StructureProvider;
use crate::slab::generator::{SlabGenerator, SlabParameters, TerminationSlabGenerator};
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};

/// 可渲染并写入磁盘的输入文件
pub trait InputFile {
    fn render(&self) -> Result<String>;

    fn write_file(&self, path: &Path) -> Result<()> {
        let content = self.render()?;
        fs::write(path, content).map_err(|e| SlabkitError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// 输入文件生成设置
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterSettings {
    /// PAW 赝势库根目录；未设置时跳过 POTCAR
    pub potcar_library: Option<PathBuf>,
    pub kpath_divisions: usize,
    pub coordinates: CoordinateMode,
}

impl Default for EmitterSettings {
    fn default() -> Self {
        EmitterSettings {
            potcar_library: None,
            kpath_divisions: kpath::DEFAULT_DIVISIONS,
            coordinates: CoordinateMode::Direct,
        }
    }
}

/// 一个 slab 的完整 VASP 作业
#[derive(Debug, Clone)]
pub struct VaspInput {
    pub structure: Crystal,
    pub job: JobType,
    pub potcar_library: Option<PathBuf>,
    pub kpoint_density: f64,
}

impl VaspInput {
    pub fn new(structure: Crystal, job: JobType) -> Self {
        VaspInput {
            structure,
            job,
            potcar_library: None,
            kpoint_density: kpoints::DEFAULT_LENGTH_DENSITY,
        }
    }

    pub fn with_potcar_library(mut self, library: Option<PathBuf>) -> Self {
        self.potcar_library = library;
        self
    }

    /// 写出 INCAR, POSCAR, KPOINTS, POTCAR，返回已写文件
    pub fn write_input_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(|e| SlabkitError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;

        let mut written = Vec::new();
        let mut emit = |name: &str, file: &dyn InputFile| -> Result<()> {
            let path = dir.join(name);
            file.write_file(&path)?;
            written.push(path);
            Ok(())
        };

        emit("INCAR", &Incar::for_job(self.job))?;
        emit("POSCAR", &Poscar::new(self.structure.clone()))?;
        emit(
            "KPOINTS",
            &Kpoints::slab_mesh(&self.structure, self.kpoint_density),
        )?;

        match &self.potcar_library {
            Some(library) => emit(
                "POTCAR",
                &Potcar::from_structure(&self.structure, Some(library)),
            )?,
            None => output::print_warning(&format!(
                "No POTCAR library configured, skipping POTCAR in {}",
                dir.display()
            )),
        }

        Ok(written)
    }
}

/// 单次生成一套 slab 输入的选项
#[derive(Debug, Clone, PartialEq)]
pub struct SlabInputOptions {
    pub min_slab_size: f64,
    pub min_vacuum_size: f64,
    pub in_unit_planes: bool,
    pub ensure_symmetric: bool,
    pub job: JobType,
    pub potcar_library: Option<PathBuf>,
}

impl Default for SlabInputOptions {
    fn default() -> Self {
        SlabInputOptions {
            min_slab_size: 15.0,
            min_vacuum_size: 15.0,
            in_unit_planes: false,
            ensure_symmetric: true,
            job: JobType::SlabRelaxationMedPrec,
            potcar_library: None,
        }
    }
}

impl SlabInputOptions {
    pub fn slab_parameters(&self) -> SlabParameters {
        SlabParameters {
            min_slab_size: self.min_slab_size,
            min_vacuum_size: self.min_vacuum_size,
            in_unit_planes: self.in_unit_planes,
            symmetric: self.ensure_symmetric,
            ..SlabParameters::default()
        }
    }
}

/// 从数据库获取体相结构并写出 slab 输入
pub fn write_inputs_for_material(
    provider: &dyn StructureProvider,
    id: &str,
    plane: &MillerIndex,
    options: &SlabInputOptions,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let bulk = provider.fetch(id)?;
    write_inputs_for_structure(&bulk, plane, options, dir)
}

/// 对给定体相结构切 slab 并写出输入，返回每个 slab 的作业目录。
///
/// 只尝试一次（不做对称 → 非对称回退）。多个终止面时，
/// 第 i 个 slab 写入 `dir/termination_<i>/`。
pub fn write_inputs_for_structure(
    bulk: &Crystal,
    plane: &MillerIndex,
    options: &SlabInputOptions,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    write_inputs_with_generator(
        &TerminationSlabGenerator::default(),
        bulk,
        plane,
        options,
        dir,
    )
}

pub fn write_inputs_with_generator(
    generator: &dyn SlabGenerator,
    bulk: &Crystal,
    plane: &MillerIndex,
    options: &SlabInputOptions,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let slabs = generator.generate(bulk, plane, &options.slab_parameters())?;
    let single = slabs.len() == 1;

    let mut job_dirs = Vec::with_capacity(slabs.len());
    for (i, slab) in slabs.into_iter().enumerate() {
        let job_dir = if single {
            dir.to_path_buf()
        } else {
            dir.join(format!("termination_{}", i))
        };

        VaspInput::new(slab, options.job)
            .with_potcar_library(options.potcar_library.clone())
            .write_input_files(&job_dir)?;
        make_kpath(&job_dir.join("POSCAR"), &job_dir.join("KPATH"))?;

        job_dirs.push(job_dir);
    }

    Ok(job_dirs)
}
