//! # slab 汇总表
//!
//! 每个 slab 一行：成分、厚度、真空层、原子数、晶面、是否对称、体相对称性。
//! 支持多张表拼接、终端打印（tabled）与 CSV 导出。
//!
//! ## 依赖关系
//! - 被 `slab/aggregate.rs`, `commands/sweep.rs` 使用
//! - 使用 `tabled`, `csv`, `serde`

use crate::error::{Result, SlabkitError};

use serde::Serialize;
use std::path::Path;
use tabled::{Table, Tabled};

/// 汇总表的一行（CSV 列名与表头一致）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Composition")]
    pub composition: String,
    #[serde(rename = "Thickness")]
    pub thickness: f64,
    #[serde(rename = "Vacuum")]
    pub vacuum: f64,
    #[serde(rename = "Number of Atoms")]
    pub num_atoms: usize,
    #[serde(rename = "Plane")]
    pub plane: String,
    #[serde(rename = "Symmetric")]
    pub symmetric: bool,
    #[serde(rename = "Symmetry Group")]
    pub symmetry_group: String,
}

/// 终端显示用的行
#[derive(Debug, Clone, Tabled)]
struct DisplayRow {
    #[tabled(rename = "Composition")]
    composition: String,
    #[tabled(rename = "Thickness (Å)")]
    thickness: String,
    #[tabled(rename = "Vacuum (Å)")]
    vacuum: String,
    #[tabled(rename = "Number of Atoms")]
    num_atoms: usize,
    #[tabled(rename = "Plane")]
    plane: String,
    #[tabled(rename = "Symmetric")]
    symmetric: bool,
    #[tabled(rename = "Symmetry Group")]
    symmetry_group: String,
}

impl From<&SummaryRow> for DisplayRow {
    fn from(row: &SummaryRow) -> Self {
        DisplayRow {
            composition: row.composition.clone(),
            thickness: format!("{:.3}", row.thickness),
            vacuum: format!("{:.3}", row.vacuum),
            num_atoms: row.num_atoms,
            plane: row.plane.clone(),
            symmetric: row.symmetric,
            symmetry_group: row.symmetry_group.clone(),
        }
    }
}

/// 拼接多张表（保持顺序）
pub fn concat_tables<I>(tables: I) -> Vec<SummaryRow>
where
    I: IntoIterator<Item = Vec<SummaryRow>>,
{
    tables.into_iter().flatten().collect()
}

/// 渲染为终端表格
pub fn render_table(rows: &[SummaryRow]) -> String {
    let display: Vec<DisplayRow> = rows.iter().map(DisplayRow::from).collect();
    Table::new(&display).to_string()
}

/// 保存为 CSV
pub fn save_csv(rows: &[SummaryRow], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path).map_err(SlabkitError::CsvError)?;

    if rows.is_empty() {
        wtr.write_record([
            "Composition",
            "Thickness",
            "Vacuum",
            "Number of Atoms",
            "Plane",
            "Symmetric",
            "Symmetry Group",
        ])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush().map_err(|e| SlabkitError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
