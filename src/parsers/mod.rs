//! # 解析器模块
//!
//! 读取体相结构文件：POSCAR/CONTCAR、CIF、pymatgen JSON；
//! 并提供 POSCAR 写出。
//!
//! ## 依赖关系
//! - 被 `provider/`, `vasp/`, `commands/` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: poscar, cif, pmg_json

pub mod cif;
pub mod pmg_json;
pub mod poscar;

use crate::error::{Result, SlabkitError};
use crate::models::Crystal;
use std::path::Path;

/// 判断文件名是否为 POSCAR/CONTCAR 类
pub fn is_poscar_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.starts_with("POSCAR") || name.starts_with("CONTCAR"))
        .unwrap_or(false)
}

/// 从文件路径推断格式并解析
pub fn parse_structure_file(path: &Path) -> Result<Crystal> {
    if !path.exists() {
        return Err(SlabkitError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "cif" => cif::parse_cif_file(path),
        "json" => pmg_json::parse_pmg_json_file(path),
        "vasp" | "poscar" => poscar::parse_poscar_file(path),
        _ if is_poscar_name(path) => poscar::parse_poscar_file(path),
        _ => Err(SlabkitError::UnsupportedFormat(format!(
            "Cannot determine format for: {}",
            path.display()
        ))),
    }
}
