//! # 结构数据来源
//!
//! 以 `StructureProvider` trait 抽象"按标识符获取体相结构"，
//! 使 slab 汇总逻辑与具体数据库解耦。
//!
//! - `MaterialsProject`: REST 接口
//! - `FileProvider`: 标识符即本地结构文件路径
//! - `CachedProvider`: 包装任一来源，同一标识符只获取一次
//!
//! ## 依赖关系
//! - 被 `slab/aggregate.rs`, `vasp/mod.rs`, `commands/` 使用
//! - 子模块: materials_project
//! - 使用 `parsers/` 读取本地文件

pub mod materials_project;

pub use materials_project::MaterialsProject;

use crate::error::{Result, SlabkitError};
use crate::models::Crystal;
use crate::parsers;

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{LazyLock, Mutex};

static MATERIAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(mp|mvc)-\d+$").unwrap());

/// 校验 Materials Project 标识符，如 `mp-149`、`mvc-12`
pub fn validate_material_id(id: &str) -> Result<()> {
    if MATERIAL_ID.is_match(id.trim()) {
        Ok(())
    } else {
        Err(SlabkitError::InvalidMaterialId(id.to_string()))
    }
}

/// 按标识符获取体相晶体结构
pub trait StructureProvider: Send + Sync {
    fn fetch(&self, id: &str) -> Result<Crystal>;
}

/// 标识符即本地结构文件路径
#[derive(Debug, Clone, Copy, Default)]
pub struct FileProvider;

impl StructureProvider for FileProvider {
    fn fetch(&self, id: &str) -> Result<Crystal> {
        parsers::parse_structure_file(Path::new(id))
    }
}

/// 缓存已获取的结构；并发请求同一标识符时只有一个真正访问数据源
pub struct CachedProvider {
    inner: Box<dyn StructureProvider>,
    cache: Mutex<HashMap<String, Crystal>>,
}

impl CachedProvider {
    pub fn new(inner: Box<dyn StructureProvider>) -> Self {
        CachedProvider {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

impl StructureProvider for CachedProvider {
    fn fetch(&self, id: &str) -> Result<Crystal> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| SlabkitError::Other("structure cache lock poisoned".to_string()))?;
        if let Some(crystal) = cache.get(id) {
            return Ok(crystal.clone());
        }
        let crystal = self.inner.fetch(id)?;
        cache.insert(id.to_string(), crystal.clone());
        Ok(crystal)
    }
}
