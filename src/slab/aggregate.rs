//! # slab 汇总
//!
//! 对一个 (体相, 晶面, 最小厚度) 请求生成全部 slab 终止面，
//! 并一次性构建每个 slab 的 POSCAR / POTCAR / KPATH 与汇总表信息。
//!
//! ## 回退策略
//! 先请求对称终止面；仅当生成器报告 `SymmetricSlabInfeasible` 时，
//! 再以非对称方式重试一次。其他错误直接向上传播。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `slab/generator.rs`, `slab/table.rs`, `vasp/`, `symmetry/`, `provider/`

use super::generator::{SlabGenerator, SlabParameters};
use super::table::SummaryRow;
use crate::error::{Result, SlabkitError};
use crate::models::{Crystal, MillerIndex};
use crate::provider::StructureProvider;
use crate::symmetry;
use crate::vasp::{EmitterSettings, KpathFile, Poscar, Potcar};

/// 一个晶面请求的全部 slab 及其输入文件。构建后不可变。
#[derive(Debug, Clone)]
pub struct SlabAggregate {
    bulk: Crystal,
    plane: MillerIndex,
    min_slab_size: f64,
    is_symmetric: bool,
    slabs: Vec<Crystal>,
    poscars: Vec<Poscar>,
    potcars: Vec<Potcar>,
    kpaths: Vec<KpathFile>,
    symmetry: String,
    basename: String,
}

impl SlabAggregate {
    pub fn new(
        bulk: Crystal,
        plane: MillerIndex,
        min_slab_size: f64,
        generator: &dyn SlabGenerator,
        emit: &EmitterSettings,
    ) -> Result<Self> {
        let params = SlabParameters {
            min_slab_size,
            ..SlabParameters::default()
        };

        let (slabs, is_symmetric) =
            match generator.generate(&bulk, &plane, &params.with_symmetric(true)) {
                Ok(slabs) => (slabs, true),
                Err(SlabkitError::SymmetricSlabInfeasible { .. }) => (
                    generator.generate(&bulk, &plane, &params.with_symmetric(false))?,
                    false,
                ),
                Err(e) => return Err(e),
            };

        let poscars: Vec<Poscar> = slabs
            .iter()
            .map(|s| Poscar::new(s.clone()).with_mode(emit.coordinates))
            .collect();
        let potcars: Vec<Potcar> = slabs
            .iter()
            .map(|s| Potcar::from_structure(s, emit.potcar_library.as_deref()))
            .collect();
        let kpaths: Vec<KpathFile> = slabs
            .iter()
            .map(|s| KpathFile::from_structure(s, emit.kpath_divisions))
            .collect();

        let symmetry = symmetry::symmetry_label(&bulk);
        let basename = format!("{}_{}", bulk.reduced_formula(), plane.label());

        Ok(SlabAggregate {
            bulk,
            plane,
            min_slab_size,
            is_symmetric,
            slabs,
            poscars,
            potcars,
            kpaths,
            symmetry,
            basename,
        })
    }

    /// 先从数据源获取体相结构，再构建
    pub fn from_material_id(
        provider: &dyn StructureProvider,
        id: &str,
        plane: MillerIndex,
        min_slab_size: f64,
        generator: &dyn SlabGenerator,
        emit: &EmitterSettings,
    ) -> Result<Self> {
        let bulk = provider.fetch(id)?;
        Self::new(bulk, plane, min_slab_size, generator, emit)
    }

    pub fn bulk(&self) -> &Crystal {
        &self.bulk
    }

    pub fn plane(&self) -> &MillerIndex {
        &self.plane
    }

    pub fn min_slab_size(&self) -> f64 {
        self.min_slab_size
    }

    pub fn is_symmetric(&self) -> bool {
        self.is_symmetric
    }

    pub fn slabs(&self) -> &[Crystal] {
        &self.slabs
    }

    pub fn poscars(&self) -> &[Poscar] {
        &self.poscars
    }

    pub fn potcars(&self) -> &[Potcar] {
        &self.potcars
    }

    pub fn kpaths(&self) -> &[KpathFile] {
        &self.kpaths
    }

    /// 体相空间群（或点群）符号
    pub fn symmetry(&self) -> &str {
        &self.symmetry
    }

    /// "<约化化学式>_<晶面标签>"
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// 每个 slab 一行。依赖生成器保证的"从上到下"原子顺序：
    /// 第一个原子为顶层，最后一个为底层。
    pub fn to_table(&self) -> Vec<SummaryRow> {
        self.poscars
            .iter()
            .map(|poscar| {
                let structure = &poscar.structure;
                let z = |i: usize| structure.cart_coords(i).map(|c| c[2]).unwrap_or(0.0);
                let top = z(0);
                let bottom = z(structure.num_sites().saturating_sub(1));
                let c_length = structure.lattice.abc()[2];

                SummaryRow {
                    composition: structure.reduced_formula(),
                    thickness: top - bottom,
                    vacuum: c_length - top,
                    num_atoms: structure.num_sites(),
                    plane: self.plane.label(),
                    symmetric: self.is_symmetric,
                    symmetry_group: self.symmetry.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};
    use crate::slab::generator::TerminationSlabGenerator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 按预设结果应答的生成器，并记录被调用时的 symmetric 参数
    struct StubGenerator {
        symmetric: fn() -> Result<Vec<Crystal>>,
        asymmetric: fn() -> Result<Vec<Crystal>>,
        calls: AtomicUsize,
    }

    impl StubGenerator {
        fn new(
            symmetric: fn() -> Result<Vec<Crystal>>,
            asymmetric: fn() -> Result<Vec<Crystal>>,
        ) -> Self {
            StubGenerator {
                symmetric,
                asymmetric,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SlabGenerator for StubGenerator {
        fn generate(
            &self,
            _bulk: &Crystal,
            _plane: &MillerIndex,
            params: &SlabParameters,
        ) -> Result<Vec<Crystal>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if params.symmetric {
                (self.symmetric)()
            } else {
                (self.asymmetric)()
            }
        }
    }

    struct StubProvider;

    impl StructureProvider for StubProvider {
        fn fetch(&self, id: &str) -> Result<Crystal> {
            match id {
                "mp-1" => Ok(bulk()),
                other => Err(SlabkitError::ProviderError {
                    id: other.to_string(),
                    reason: "not found".to_string(),
                }),
            }
        }
    }

    fn bulk() -> Crystal {
        let lattice = Lattice::from_parameters(3.0, 3.0, 3.0, 90.0, 90.0, 90.0);
        let mut crystal = Crystal::new("Po", lattice, vec![Atom::new("Po", [0.0, 0.0, 0.0])]);
        crystal.space_group = Some("Pm-3m".to_string());
        crystal
    }

    /// 4 个已按 z 从上到下排好的位点，c = 20 Å
    fn stub_slab() -> Crystal {
        let lattice = Lattice::from_parameters(3.0, 3.0, 20.0, 90.0, 90.0, 90.0);
        let atoms = vec![
            Atom::new("Bi", [0.0, 0.0, 0.50]),
            Atom::new("Se", [0.5, 0.5, 0.40]),
            Atom::new("Se", [0.0, 0.0, 0.30]),
            Atom::new("Bi", [0.5, 0.5, 0.20]),
        ];
        Crystal::new("stub", lattice, atoms)
    }

    fn two_slabs() -> Result<Vec<Crystal>> {
        Ok(vec![stub_slab(), stub_slab()])
    }

    fn infeasible() -> Result<Vec<Crystal>> {
        Err(SlabkitError::SymmetricSlabInfeasible {
            plane: "111".to_string(),
            min_slab_size: 10.0,
        })
    }

    fn generation_failure() -> Result<Vec<Crystal>> {
        Err(SlabkitError::SlabGeneration("boom".to_string()))
    }

    fn plane_111() -> MillerIndex {
        MillerIndex::new(1, 1, 1)
    }

    #[test]
    fn test_symmetric_success_marks_every_row() {
        let generator = StubGenerator::new(two_slabs, generation_failure);
        let agg = SlabAggregate::new(bulk(), plane_111(), 10.0, &generator, &EmitterSettings::default())
            .unwrap();

        assert!(agg.is_symmetric());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        let rows = agg.to_table();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.symmetric && r.plane == "111"));
    }

    #[test]
    fn test_fallback_to_asymmetric() {
        let generator = StubGenerator::new(infeasible, two_slabs);
        let agg = SlabAggregate::new(bulk(), plane_111(), 10.0, &generator, &EmitterSettings::default())
            .unwrap();

        assert!(!agg.is_symmetric());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
        assert!(agg.to_table().iter().all(|r| !r.symmetric));
    }

    #[test]
    fn test_both_attempts_fail() {
        let generator = StubGenerator::new(infeasible, generation_failure);
        let result =
            SlabAggregate::new(bulk(), plane_111(), 10.0, &generator, &EmitterSettings::default());
        assert!(matches!(result, Err(SlabkitError::SlabGeneration(_))));
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let generator = StubGenerator::new(generation_failure, two_slabs);
        let result =
            SlabAggregate::new(bulk(), plane_111(), 10.0, &generator, &EmitterSettings::default());
        assert!(matches!(result, Err(SlabkitError::SlabGeneration(_))));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_emitters_are_index_aligned() {
        let generator = StubGenerator::new(two_slabs, two_slabs);
        let agg = SlabAggregate::new(bulk(), plane_111(), 10.0, &generator, &EmitterSettings::default())
            .unwrap();
        assert_eq!(agg.slabs().len(), 2);
        assert_eq!(agg.poscars().len(), 2);
        assert_eq!(agg.potcars().len(), 2);
        assert_eq!(agg.kpaths().len(), 2);
        assert_eq!(agg.potcars()[0].symbols, vec!["Bi_d", "Se"]);
    }

    #[test]
    fn test_geometry_columns() {
        let generator = StubGenerator::new(two_slabs, two_slabs);
        let agg = SlabAggregate::new(bulk(), plane_111(), 10.0, &generator, &EmitterSettings::default())
            .unwrap();
        let row = &agg.to_table()[0];

        assert_eq!(row.composition, "BiSe");
        assert_eq!(row.num_atoms, 4);
        assert!((row.thickness - 6.0).abs() < 1e-9);
        assert!((row.vacuum - 10.0).abs() < 1e-9);
        // 真空 + 厚度 + 底层高度 = c
        assert!((row.vacuum + row.thickness + 4.0 - 20.0).abs() < 1e-9);
        assert_eq!(row.symmetry_group, "Pm-3m");
    }

    #[test]
    fn test_from_material_id() {
        let generator = StubGenerator::new(two_slabs, two_slabs);
        let agg = SlabAggregate::from_material_id(
            &StubProvider,
            "mp-1",
            MillerIndex::new(0, 0, 1),
            10.0,
            &generator,
            &EmitterSettings::default(),
        )
        .unwrap();
        assert_eq!(agg.basename(), "Po_001");

        let missing = SlabAggregate::from_material_id(
            &StubProvider,
            "mp-2",
            MillerIndex::new(0, 0, 1),
            10.0,
            &generator,
            &EmitterSettings::default(),
        );
        assert!(matches!(missing, Err(SlabkitError::ProviderError { .. })));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_end_to_end_with_native_generator() {
        let agg = SlabAggregate::new(
            bulk(),
            MillerIndex::new(0, 0, 1),
            10.0,
            &TerminationSlabGenerator::default(),
            &EmitterSettings::default(),
        )
        .unwrap();

        assert!(agg.is_symmetric());
        assert!(!agg.slabs().is_empty());
        assert_eq!(agg.to_table().len(), agg.slabs().len());
        assert_eq!(agg.basename(), "Po_001");

        let row = &agg.to_table()[0];
        assert!((row.thickness - 9.0).abs() < 1e-9);
        assert!((row.vacuum - 13.5).abs() < 1e-9);
    }

    #[test]
    fn test_point_group_label_without_recorded_space_group() {
        let mut cubic = bulk();
        cubic.space_group = None;
        let generator = StubGenerator::new(two_slabs, two_slabs);
        let agg = SlabAggregate::new(cubic, plane_111(), 10.0, &generator, &EmitterSettings::default())
            .unwrap();
        assert_eq!(agg.symmetry(), "m-3m");
    }
}
