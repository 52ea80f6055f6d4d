//! # CIF 格式解析器
//!
//! 读取晶胞参数、原子位点 loop 与对称操作 loop，并把不对称单元
//! 展开为完整晶胞。
//!
//! ## 支持的标签
//! - `_cell_length_{a,b,c}`, `_cell_angle_{alpha,beta,gamma}`（允许带不确定度括号）
//! - `_atom_site_type_symbol` 或 `_atom_site_label`, `_atom_site_fract_{x,y,z}`
//! - `_symmetry_equiv_pos_as_xyz` / `_space_group_symop_operation_xyz`
//! - `_symmetry_space_group_name_H-M` / `_space_group_name_H-M_alt`
//!
//! 占位度不做处理：所有位点按完全占据读入。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{Result, SlabkitError};
use crate::models::{Atom, Crystal, Lattice};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 展开后两个位点视为同一位点的笛卡尔距离 (Å)
const MERGE_TOLERANCE: f64 = 0.01;

const SYMOP_TAGS: [&str; 2] = [
    "_symmetry_equiv_pos_as_xyz",
    "_space_group_symop_operation_xyz",
];

const SPACE_GROUP_TAGS: [&str; 2] = [
    "_symmetry_space_group_name_h-m",
    "_space_group_name_h-m_alt",
];

/// 一个对称操作的一个分量：x' = r·(x, y, z) + t
#[derive(Debug, Clone, Copy, PartialEq)]
struct AffineRow {
    r: [f64; 3],
    t: f64,
}

/// 解析 CIF 文件
pub fn parse_cif_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| SlabkitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    let mut crystal = parse_cif_content(&content, name)?;
    crystal.source = Some(path.display().to_string());
    Ok(crystal)
}

fn parse_error(name: &str, reason: impl Into<String>) -> SlabkitError {
    SlabkitError::ParseError {
        format: "cif".to_string(),
        path: name.to_string(),
        reason: reason.into(),
    }
}

/// 解析带不确定度的浮点数，例如 "1.234(5)" -> 1.234
fn parse_cif_float(s: &str) -> Option<f64> {
    s.split('(').next().unwrap_or(s).parse().ok()
}

/// 按空白切分，保留引号内的内容
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => {
                tokens.push(std::mem::take(&mut current));
                quote = None;
            }
            Some(_) => current.push(ch),
            None if ch == '\'' || ch == '"' => quote = Some(ch),
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => current.push(ch),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// 从 "Fe1", "O2-", "fe" 之类的标签中提取元素符号
fn element_from_label(label: &str) -> String {
    let letters: String = label.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let mut chars = letters.chars();
    let first = chars.next().map(|c| c.to_ascii_uppercase());
    let second = chars.next().map(|c| c.to_ascii_lowercase());

    match (first, second) {
        (Some(f), Some(s)) => {
            let two = format!("{}{}", f, s);
            if crate::models::elements::is_element(&two) {
                two
            } else {
                f.to_string()
            }
        }
        (Some(f), None) => f.to_string(),
        _ => label.to_string(),
    }
}

/// 解析 "x-y+1/2" 形式的一个分量
fn parse_symop_component(expr: &str) -> Option<AffineRow> {
    let mut row = AffineRow { r: [0.0; 3], t: 0.0 };
    let cleaned: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }

    // 以 +/- 切分为带符号的项
    let mut terms: Vec<String> = Vec::new();
    for ch in cleaned.to_lowercase().chars() {
        if (ch == '+' || ch == '-') && !terms.last().is_some_and(|t| t == "+" || t == "-") {
            terms.push(ch.to_string());
        } else if let Some(last) = terms.last_mut() {
            last.push(ch);
        } else {
            terms.push(ch.to_string());
        }
    }

    for term in terms {
        let (sign, body) = match term.strip_prefix('-') {
            Some(rest) => (-1.0, rest.to_string()),
            None => (1.0, term.trim_start_matches('+').to_string()),
        };
        if body.is_empty() {
            return None;
        }

        let axis = body.find(['x', 'y', 'z']);
        match axis {
            Some(pos) => {
                let var = body[pos..].chars().next()?;
                let coeff_str = body[..pos].trim_end_matches('*');
                let coeff = if coeff_str.is_empty() {
                    1.0
                } else {
                    parse_fraction(coeff_str)?
                };
                let idx = match var {
                    'x' => 0,
                    'y' => 1,
                    _ => 2,
                };
                row.r[idx] += sign * coeff;
            }
            None => row.t += sign * parse_fraction(&body)?,
        }
    }

    Some(row)
}

fn parse_fraction(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, den)) => {
            let den: f64 = den.parse().ok()?;
            (den != 0.0).then_some(num.parse::<f64>().ok()? / den)
        }
        None => s.parse().ok(),
    }
}

fn parse_symop(expr: &str) -> Option<[AffineRow; 3]> {
    let parts: Vec<&str> = expr.split(',').collect();
    if parts.len() != 3 {
        return None;
    }
    Some([
        parse_symop_component(parts[0])?,
        parse_symop_component(parts[1])?,
        parse_symop_component(parts[2])?,
    ])
}

fn apply_symop(op: &[AffineRow; 3], p: [f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (o, row) in out.iter_mut().zip(op.iter()) {
        let v = row.r[0] * p[0] + row.r[1] * p[1] + row.r[2] * p[2] + row.t;
        *o = v.rem_euclid(1.0);
        // 1.0 - ε 折回 0
        if (*o - 1.0).abs() < 1e-8 {
            *o = 0.0;
        }
    }
    out
}

/// 从字符串内容解析 CIF
pub fn parse_cif_content(content: &str, default_name: &str) -> Result<Crystal> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();

    let mut name = default_name.to_string();
    let mut cell: HashMap<String, f64> = HashMap::new();
    let mut space_group: Option<String> = None;
    let mut sites: Vec<(String, [f64; 3])> = Vec::new();
    let mut symops: Vec<[AffineRow; 3]> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let lower = line.to_lowercase();

        if let Some(block) = line.strip_prefix("data_") {
            if !block.is_empty() {
                name = block.to_string();
            }
        } else if lower.starts_with("_cell_") {
            let tokens = tokenize(line);
            if let Some(value) = tokens.get(1).and_then(|v| parse_cif_float(v)) {
                cell.insert(tokens[0].to_lowercase(), value);
            }
        } else if SPACE_GROUP_TAGS.iter().any(|t| lower.starts_with(t)) {
            let tokens = tokenize(line);
            if let Some(symbol) = tokens.get(1) {
                let compact: String = symbol.chars().filter(|c| !c.is_whitespace()).collect();
                if !compact.is_empty() && compact != "?" {
                    space_group = Some(compact);
                }
            }
        } else if lower.starts_with("loop_") {
            i += 1;
            let mut headers: Vec<String> = Vec::new();
            while i < lines.len() && lines[i].starts_with('_') {
                headers.push(lines[i].split_whitespace().next().unwrap_or("").to_lowercase());
                i += 1;
            }
            let column = |tag: &str| headers.iter().position(|h| h == tag);

            let mut rows: Vec<Vec<String>> = Vec::new();
            while i < lines.len()
                && !lines[i].starts_with('_')
                && !lines[i].to_lowercase().starts_with("loop_")
                && !lines[i].starts_with("data_")
            {
                rows.push(tokenize(lines[i]));
                i += 1;
            }

            if let Some(x_idx) = column("_atom_site_fract_x") {
                let y_idx = column("_atom_site_fract_y")
                    .ok_or_else(|| parse_error(&name, "missing _atom_site_fract_y"))?;
                let z_idx = column("_atom_site_fract_z")
                    .ok_or_else(|| parse_error(&name, "missing _atom_site_fract_z"))?;
                let symbol_idx = column("_atom_site_type_symbol")
                    .or_else(|| column("_atom_site_label"))
                    .ok_or_else(|| parse_error(&name, "missing atom site symbol or label"))?;

                // 一条记录可以跨多行书写，按表头数重新分组
                let values: Vec<String> = rows.into_iter().flatten().collect();
                if headers.is_empty() || values.len() % headers.len() != 0 {
                    return Err(parse_error(
                        &name,
                        format!(
                            "atom site loop has {} values for {} columns",
                            values.len(),
                            headers.len()
                        ),
                    ));
                }
                for row in values.chunks(headers.len()) {
                    let coord = |idx: usize| {
                        parse_cif_float(&row[idx]).ok_or_else(|| {
                            parse_error(&name, format!("invalid coordinate '{}'", row[idx]))
                        })
                    };
                    let position = [coord(x_idx)?, coord(y_idx)?, coord(z_idx)?];
                    sites.push((element_from_label(&row[symbol_idx]), position));
                }
            } else if let Some(op_idx) = SYMOP_TAGS.iter().find_map(|t| column(t)) {
                for row in rows.iter().filter(|r| r.len() > op_idx) {
                    let op = parse_symop(&row[op_idx]).ok_or_else(|| {
                        parse_error(&name, format!("invalid symmetry operation '{}'", row[op_idx]))
                    })?;
                    symops.push(op);
                }
            }
            continue;
        }
        i += 1;
    }

    let param = |key: &str| {
        cell.get(key)
            .copied()
            .ok_or_else(|| parse_error(&name, format!("missing tag {}", key)))
    };
    let lattice = Lattice::from_parameters(
        param("_cell_length_a")?,
        param("_cell_length_b")?,
        param("_cell_length_c")?,
        param("_cell_angle_alpha")?,
        param("_cell_angle_beta")?,
        param("_cell_angle_gamma")?,
    );

    if sites.is_empty() {
        return Err(parse_error(&name, "no atom sites found"));
    }

    if symops.is_empty() {
        symops.push(parse_symop("x,y,z").ok_or_else(|| parse_error(&name, "identity"))?);
    }

    let mut atoms: Vec<Atom> = Vec::new();
    for (element, position) in &sites {
        for op in &symops {
            let image = apply_symop(op, *position);
            let duplicate = atoms.iter().any(|a| {
                let d = [
                    image[0] - a.position[0],
                    image[1] - a.position[1],
                    image[2] - a.position[2],
                ];
                let d = d.map(|x| x - x.round());
                let cart = lattice.to_cartesian(d);
                (cart[0] * cart[0] + cart[1] * cart[1] + cart[2] * cart[2]).sqrt() < MERGE_TOLERANCE
            });
            if !duplicate {
                atoms.push(Atom::new(element.clone(), image));
            }
        }
    }

    let mut crystal = Crystal::new(name, lattice, atoms);
    crystal.space_group = space_group;
    crystal.source = Some("cif".to_string());
    Ok(crystal)
}
