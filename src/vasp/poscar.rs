//! # POSCAR 输出
//!
//! ## 依赖关系
//! - 被 `vasp/mod.rs`, `slab/aggregate.rs` 使用
//! - 使用 `parsers/poscar.rs` 的读写函数

use super::InputFile;
use crate::error::Result;
use crate::models::Crystal;
use crate::parsers::poscar::{self, CoordinateMode};

#[derive(Debug, Clone)]
pub struct Poscar {
    pub structure: Crystal,
    pub mode: CoordinateMode,
}

impl Poscar {
    pub fn new(structure: Crystal) -> Self {
        Poscar {
            structure,
            mode: CoordinateMode::Direct,
        }
    }

    pub fn with_mode(mut self, mode: CoordinateMode) -> Self {
        self.mode = mode;
        self
    }
}

impl InputFile for Poscar {
    fn render(&self) -> Result<String> {
        Ok(poscar::to_poscar_string(&self.structure, self.mode))
    }
}
