//! # Miller 指数
//!
//! 表示切面方向 (hkl)，既用于 slab 生成，也用作显示标签。
//!
//! ## 依赖关系
//! - 被 `slab/`, `cli/`, `commands/` 使用
//! - 使用 `regex` 解析紧凑写法（如 "111", "-110"）

use crate::error::{Result, SlabkitError};

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static COMPACT_INDEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d").unwrap());

/// 晶面 Miller 指数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MillerIndex(pub [i32; 3]);

impl MillerIndex {
    pub fn new(h: i32, k: i32, l: i32) -> Self {
        MillerIndex([h, k, l])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0, 0, 0]
    }

    /// 数字直接拼接的标签：[1,1,1] -> "111"，[0,0,1] -> "001"
    pub fn label(&self) -> String {
        format!("{}{}{}", self.0[0], self.0[1], self.0[2])
    }

    /// 除以最大公约数后的指数
    pub fn reduced(&self) -> Result<MillerIndex> {
        if self.is_zero() {
            return Err(SlabkitError::InvalidPlane(
                "Miller indices cannot be (0 0 0)".to_string(),
            ));
        }
        let g = gcd(gcd(self.0[0], self.0[1]), self.0[2]);
        Ok(MillerIndex([self.0[0] / g, self.0[1] / g, self.0[2] / g]))
    }
}

impl fmt::Display for MillerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.0[0], self.0[1], self.0[2])
    }
}

impl FromStr for MillerIndex {
    type Err = SlabkitError;

    /// 支持 "111", "-110", "1,1,1", "1 -1 0", "[1, 1, 1]", "(0 0 1)"
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s
            .trim()
            .trim_start_matches(['[', '('])
            .trim_end_matches([']', ')']);

        let values: Vec<i32> = if trimmed.contains(',') || trimmed.contains(char::is_whitespace) {
            trimmed
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(|t| t.parse::<i32>())
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| SlabkitError::InvalidPlane(s.to_string()))?
        } else {
            if !trimmed.chars().all(|c| c == '-' || c.is_ascii_digit()) {
                return Err(SlabkitError::InvalidPlane(s.to_string()));
            }
            COMPACT_INDEX
                .find_iter(trimmed)
                .filter_map(|m| m.as_str().parse().ok())
                .collect()
        };

        match values.as_slice() {
            [h, k, l] => Ok(MillerIndex([*h, *k, *l])),
            _ => Err(SlabkitError::InvalidPlane(format!(
                "'{}' (expected three integers)",
                s
            ))),
        }
    }
}

pub(crate) fn gcd(a: i32, b: i32) -> i32 {
    let mut a = a.abs();
    let mut b = b.abs();
    while b != 0 {
        let temp = b;
        b = a % b;
        a = temp;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_concatenates_digits() {
        assert_eq!(MillerIndex::new(1, 1, 1).label(), "111");
        assert_eq!(MillerIndex::new(0, 0, 1).label(), "001");
        assert_eq!(MillerIndex::new(-1, 1, 0).label(), "-110");
    }

    #[test]
    fn test_parse_compact_and_separated() {
        assert_eq!("111".parse::<MillerIndex>().unwrap(), MillerIndex::new(1, 1, 1));
        assert_eq!("-110".parse::<MillerIndex>().unwrap(), MillerIndex::new(-1, 1, 0));
        assert_eq!("1,0,-1".parse::<MillerIndex>().unwrap(), MillerIndex::new(1, 0, -1));
        assert_eq!("[0, 0, 1]".parse::<MillerIndex>().unwrap(), MillerIndex::new(0, 0, 1));
        assert_eq!("2 1 0".parse::<MillerIndex>().unwrap(), MillerIndex::new(2, 1, 0));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("11".parse::<MillerIndex>().is_err());
        assert!("1,1".parse::<MillerIndex>().is_err());
        assert!("abc".parse::<MillerIndex>().is_err());
        assert!("1a1".parse::<MillerIndex>().is_err());
    }

    #[test]
    fn test_reduced() {
        assert_eq!(
            MillerIndex::new(2, 2, 0).reduced().unwrap(),
            MillerIndex::new(1, 1, 0)
        );
        assert_eq!(
            MillerIndex::new(0, 0, -3).reduced().unwrap(),
            MillerIndex::new(0, 0, -1)
        );
        assert!(MillerIndex::new(0, 0, 0).reduced().is_err());
    }
}
