//! # KPOINTS 生成
//!
//! Γ 中心网格，面内 k_i = max(1, round(density / |a_i|))，slab 法向 k_z = 1。
//!
//! ## 依赖关系
//! - 被 `vasp/mod.rs` 使用

use super::InputFile;
use crate::error::Result;
use crate::models::Crystal;

pub const DEFAULT_LENGTH_DENSITY: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kpoints {
    pub mesh: [usize; 3],
    pub comment: String,
}

impl Kpoints {
    pub fn slab_mesh(structure: &Crystal, density: f64) -> Self {
        let [a, b, _] = structure.lattice.abc();
        let divisions = |len: f64| ((density / len).round() as usize).max(1);
        Kpoints {
            mesh: [divisions(a), divisions(b), 1],
            comment: format!("Gamma-centred slab mesh (length density {})", density),
        }
    }
}

impl InputFile for Kpoints {
    fn render(&self) -> Result<String> {
        Ok(format!(
            "{}\n0\nGamma\n  {}  {}  {}\n  0  0  0\n",
            self.comment, self.mesh[0], self.mesh[1], self.mesh[2]
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};

    #[test]
    fn test_slab_mesh_has_single_kz() {
        let lattice = Lattice::from_parameters(4.1, 5.0, 40.0, 90.0, 90.0, 120.0);
        let slab = Crystal::new("x", lattice, vec![Atom::new("Bi", [0.0, 0.0, 0.2])]);
        let kpoints = Kpoints::slab_mesh(&slab, DEFAULT_LENGTH_DENSITY);
        assert_eq!(kpoints.mesh, [6, 5, 1]);

        let text = kpoints.render().unwrap();
        assert!(text.contains("\nGamma\n  6  5  1\n"));
    }
}
