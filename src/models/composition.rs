//! # 化学成分
//!
//! 统计元素个数并生成约化化学式。
//!
//! ## 依赖关系
//! - 被 `models/structure.rs` 使用
//! - 使用 `models/elements.rs` 的电负性排序

use crate::models::elements;

use std::collections::BTreeMap;

/// 元素 -> 原子个数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    counts: BTreeMap<String, usize>,
}

impl Composition {
    pub fn from_elements<'a>(elements: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts = BTreeMap::new();
        for el in elements {
            *counts.entry(el.to_string()).or_insert(0) += 1;
        }
        Composition { counts }
    }

    /// 约化因子（所有计数的最大公约数）
    pub fn reduction_factor(&self) -> usize {
        self.counts.values().fold(0, |acc, &n| gcd(acc, n)).max(1)
    }

    /// 约化化学式：元素按电负性升序（相同时按符号），计数为 1 时省略
    pub fn reduced_formula(&self) -> String {
        let factor = self.reduction_factor();
        let mut entries: Vec<(&String, usize)> =
            self.counts.iter().map(|(el, &n)| (el, n / factor)).collect();

        entries.sort_by(|a, b| {
            elements::formula_sort_key(a.0)
                .total_cmp(&elements::formula_sort_key(b.0))
                .then_with(|| a.0.cmp(b.0))
        });

        entries
            .into_iter()
            .map(|(el, n)| {
                if n == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, n)
                }
            })
            .collect()
    }
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
