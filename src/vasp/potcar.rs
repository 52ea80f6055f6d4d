//! # POTCAR 组装
//!
//! 按 POSCAR 中元素的出现顺序，从本地 PAW 赝势库拼接 POTCAR。
//!
//! ## 赝势库布局
//! ```text
//! <library>/POT_GGA_PAW_PBE/<symbol>/POTCAR   # pymatgen 风格
//! <library>/<symbol>/POTCAR                   # 扁平目录
//! ```
//! 赝势符号采用 Materials Project 推荐集（如 `Bi_d`, `W_pv`），
//! 表中没有的元素直接使用元素符号。
//!
//! ## 依赖关系
//! - 被 `vasp/mod.rs`, `slab/aggregate.rs` 使用

use super::InputFile;
use crate::error::{Result, SlabkitError};
use crate::models::Crystal;

use std::fs;
use std::path::{Path, PathBuf};

const FUNCTIONAL_DIR: &str = "POT_GGA_PAW_PBE";

/// 非裸元素符号的推荐赝势
const RECOMMENDED_SYMBOLS: &[(&str, &str)] = &[
    ("Li", "Li_sv"),
    ("Be", "Be_sv"),
    ("Na", "Na_pv"),
    ("Mg", "Mg_pv"),
    ("K", "K_sv"),
    ("Ca", "Ca_sv"),
    ("Sc", "Sc_sv"),
    ("Ti", "Ti_pv"),
    ("V", "V_pv"),
    ("Cr", "Cr_pv"),
    ("Mn", "Mn_pv"),
    ("Fe", "Fe_pv"),
    ("Ni", "Ni_pv"),
    ("Cu", "Cu_pv"),
    ("Ga", "Ga_d"),
    ("Ge", "Ge_d"),
    ("Rb", "Rb_sv"),
    ("Sr", "Sr_sv"),
    ("Y", "Y_sv"),
    ("Zr", "Zr_sv"),
    ("Nb", "Nb_pv"),
    ("Mo", "Mo_pv"),
    ("Tc", "Tc_pv"),
    ("Ru", "Ru_pv"),
    ("Rh", "Rh_pv"),
    ("In", "In_d"),
    ("Sn", "Sn_d"),
    ("Cs", "Cs_sv"),
    ("Ba", "Ba_sv"),
    ("Hf", "Hf_pv"),
    ("Ta", "Ta_pv"),
    ("W", "W_pv"),
    ("Re", "Re_pv"),
    ("Os", "Os_pv"),
    ("Tl", "Tl_d"),
    ("Pb", "Pb_d"),
    ("Bi", "Bi_d"),
];

/// 元素对应的赝势符号
pub fn potcar_symbol(element: &str) -> String {
    RECOMMENDED_SYMBOLS
        .iter()
        .find(|(el, _)| *el == element)
        .map(|(_, symbol)| symbol.to_string())
        .unwrap_or_else(|| element.to_string())
}

/// POTCAR：赝势符号列表 + 赝势库位置
#[derive(Debug, Clone, PartialEq)]
pub struct Potcar {
    pub symbols: Vec<String>,
    pub library: Option<PathBuf>,
}

impl Potcar {
    pub fn from_structure(structure: &Crystal, library: Option<&Path>) -> Self {
        Potcar {
            symbols: structure
                .species_order()
                .iter()
                .map(|el| potcar_symbol(el))
                .collect(),
            library: library.map(Path::to_path_buf),
        }
    }

    /// 在赝势库中定位某个符号的 POTCAR
    fn locate(library: &Path, symbol: &str) -> Option<PathBuf> {
        [
            library.join(FUNCTIONAL_DIR).join(symbol).join("POTCAR"),
            library.join(symbol).join("POTCAR"),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }
}

impl InputFile for Potcar {
    fn render(&self) -> Result<String> {
        let library = self.library.as_deref().ok_or_else(|| SlabkitError::PotcarNotFound {
            symbol: self.symbols.join(" "),
            library: "<unset> (set VASP_PSP_DIR or pass --potcar-dir)".to_string(),
        })?;

        let mut content = String::new();
        for symbol in &self.symbols {
            let path = Self::locate(library, symbol).ok_or_else(|| SlabkitError::PotcarNotFound {
                symbol: symbol.clone(),
                library: library.display().to_string(),
            })?;
            let single = fs::read_to_string(&path).map_err(|e| SlabkitError::FileReadError {
                path: path.display().to_string(),
                source: e,
            })?;
            content.push_str(&single);
            if !single.ends_with('\n') {
                content.push('\n');
            }
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};
    use tempfile::tempdir;

    fn bi2se3_like() -> Crystal {
        let lattice = Lattice::from_parameters(4.1, 4.1, 28.0, 90.0, 90.0, 120.0);
        Crystal::new(
            "Bi2Se3",
            lattice,
            vec![
                Atom::new("Se", [0.0, 0.0, 0.5]),
                Atom::new("Bi", [0.33, 0.67, 0.4]),
                Atom::new("Se", [0.67, 0.33, 0.3]),
            ],
        )
    }

    #[test]
    fn test_recommended_symbols() {
        assert_eq!(potcar_symbol("Bi"), "Bi_d");
        assert_eq!(potcar_symbol("W"), "W_pv");
        assert_eq!(potcar_symbol("Se"), "Se");
        assert_eq!(potcar_symbol("Te"), "Te");
    }

    #[test]
    fn test_assembles_in_poscar_order() {
        let dir = tempdir().unwrap();
        for (symbol, body) in [("Se", "PAW_PBE Se\nEnd of Dataset\n"), ("Bi_d", "PAW_PBE Bi_d\nEnd of Dataset")] {
            let sub = dir.path().join(FUNCTIONAL_DIR).join(symbol);
            fs::create_dir_all(&sub).unwrap();
            fs::write(sub.join("POTCAR"), body).unwrap();
        }

        let potcar = Potcar::from_structure(&bi2se3_like(), Some(dir.path()));
        assert_eq!(potcar.symbols, vec!["Se", "Bi_d"]);

        let text = potcar.render().unwrap();
        let se = text.find("PAW_PBE Se").unwrap();
        let bi = text.find("PAW_PBE Bi_d").unwrap();
        assert!(se < bi);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_missing_symbol_reported() {
        let dir = tempdir().unwrap();
        let potcar = Potcar::from_structure(&bi2se3_like(), Some(dir.path()));
        match potcar.render() {
            Err(SlabkitError::PotcarNotFound { symbol, .. }) => assert_eq!(symbol, "Se"),
            other => panic!("unexpected: {:?}", other.is_ok()),
        }
    }

    #[test]
    fn test_unset_library_is_an_error() {
        let potcar = Potcar::from_structure(&bi2se3_like(), None);
        assert!(potcar.render().is_err());
    }
}
