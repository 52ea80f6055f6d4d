//! # pymatgen Structure JSON 解析器
//!
//! Materials Project API 返回的 `structure` 字段以及 `Structure.to(fmt="json")`
//! 写出的文件都使用同一种字典格式：
//!
//! ```json
//! {
//!   "lattice": {"matrix": [[...], [...], [...]]},
//!   "sites": [
//!     {"species": [{"element": "Bi", "occu": 1}], "abc": [0.0, 0.0, 0.4], "label": "Bi"}
//!   ]
//! }
//! ```
//!
//! 只接受有序结构：部分占据或多物种位点会被拒绝。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs`, `provider/materials_project.rs` 使用
//! - 使用 `serde`, `serde_json`

use crate::error::{Result, SlabkitError};
use crate::models::{Atom, Crystal, Lattice};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct PmgLattice {
    pub matrix: [[f64; 3]; 3],
}

#[derive(Debug, Clone, Deserialize)]
pub struct PmgSpecies {
    pub element: String,
    #[serde(default = "full_occupancy")]
    pub occu: f64,
}

fn full_occupancy() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct PmgSite {
    pub species: Vec<PmgSpecies>,
    pub abc: [f64; 3],
}

/// pymatgen `Structure.as_dict()` 的子集
#[derive(Debug, Clone, Deserialize)]
pub struct PmgStructure {
    pub lattice: PmgLattice,
    pub sites: Vec<PmgSite>,
}

impl PmgStructure {
    /// 转换为 Crystal；`name` 用于错误信息与结构名
    pub fn into_crystal(self, name: &str) -> Result<Crystal> {
        let lattice = Lattice::from_vectors(self.lattice.matrix);
        let mut atoms = Vec::with_capacity(self.sites.len());

        for (i, site) in self.sites.into_iter().enumerate() {
            let species = match site.species.as_slice() {
                [single] if (single.occu - 1.0).abs() < 1e-6 => single,
                _ => {
                    return Err(SlabkitError::ParseError {
                        format: "json".to_string(),
                        path: name.to_string(),
                        reason: format!("site {} is disordered or partially occupied", i),
                    })
                }
            };
            // "Fe2+" 之类的氧化态标注只保留元素
            let element: String = species
                .element
                .chars()
                .take_while(|c| c.is_ascii_alphabetic())
                .collect();

            atoms.push(Atom::new(element, site.abc));
        }

        Ok(Crystal::new(name, lattice, atoms))
    }
}

/// 从 JSON 字符串解析
pub fn parse_pmg_json_content(content: &str, name: &str) -> Result<Crystal> {
    let structure: PmgStructure = serde_json::from_str(content)?;
    let mut crystal = structure.into_crystal(name)?;
    crystal.source = Some("json".to_string());
    Ok(crystal)
}

/// 解析 pymatgen JSON 结构文件
pub fn parse_pmg_json_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| SlabkitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    let mut crystal = parse_pmg_json_content(&content, name)?;
    crystal.source = Some(path.display().to_string());
    Ok(crystal)
}
