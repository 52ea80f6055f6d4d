//! # INCAR 生成
//!
//! 每种作业类型对应一组固定的 INCAR 参数。
//!
//! ## 依赖关系
//! - 被 `vasp/mod.rs`, `cli/` 使用

use super::InputFile;
use crate::error::Result;

use clap::ValueEnum;
use std::fmt;

/// 作业类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum JobType {
    /// Slab relaxation, medium precision
    #[default]
    SlabRelaxationMedPrec,
    /// Slab relaxation, high precision
    SlabRelaxationHighPrec,
    /// Static self-consistent run on a fixed slab
    SlabStatic,
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobType::SlabRelaxationMedPrec => "slab relaxation, medium precision",
            JobType::SlabRelaxationHighPrec => "slab relaxation, high precision",
            JobType::SlabStatic => "slab static",
        };
        write!(f, "{}", name)
    }
}

/// INCAR：有序的 (标签, 值) 列表
#[derive(Debug, Clone, PartialEq)]
pub struct Incar {
    pub comment: String,
    pub tags: Vec<(String, String)>,
}

impl Incar {
    pub fn for_job(job: JobType) -> Self {
        let mut tags: Vec<(&str, &str)> = match job {
            JobType::SlabRelaxationMedPrec => vec![
                ("PREC", "Normal"),
                ("ENCUT", "400"),
                ("EDIFF", "1E-5"),
                ("EDIFFG", "-0.02"),
                ("IBRION", "2"),
                ("ISIF", "2"),
                ("NSW", "100"),
            ],
            JobType::SlabRelaxationHighPrec => vec![
                ("PREC", "Accurate"),
                ("ENCUT", "520"),
                ("EDIFF", "1E-6"),
                ("EDIFFG", "-0.01"),
                ("IBRION", "2"),
                ("ISIF", "2"),
                ("NSW", "200"),
            ],
            JobType::SlabStatic => vec![
                ("PREC", "Accurate"),
                ("ENCUT", "520"),
                ("EDIFF", "1E-6"),
                ("IBRION", "-1"),
                ("NSW", "0"),
            ],
        };

        tags.extend([
            ("ISMEAR", "0"),
            ("SIGMA", "0.05"),
            ("LDIPOL", ".TRUE."),
            ("IDIPOL", "3"),
            ("LREAL", "Auto"),
            ("LWAVE", ".FALSE."),
            ("LCHARG", if job == JobType::SlabStatic { ".TRUE." } else { ".FALSE." }),
        ]);

        Incar {
            comment: job.to_string(),
            tags: tags
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

}

impl InputFile for Incar {
    fn render(&self) -> Result<String> {
        let width = self.tags.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        let mut out = format!("# {}\n", self.comment);
        for (tag, value) in &self.tags {
            out.push_str(&format!("{:<width$} = {}\n", tag, value, width = width));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag<'a>(incar: &'a Incar, name: &str) -> Option<&'a str> {
        incar
            .tags
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_medium_precision_relaxation() {
        let incar = Incar::for_job(JobType::SlabRelaxationMedPrec);
        assert_eq!(tag(&incar, "ENCUT"), Some("400"));
        assert_eq!(tag(&incar, "isif"), Some("2"));
        assert_eq!(tag(&incar, "LDIPOL"), Some(".TRUE."));

        let text = incar.render().unwrap();
        assert!(text.starts_with("# slab relaxation, medium precision\n"));
        assert!(text.contains("IBRION = 2\n"));
    }

    #[test]
    fn test_static_job_keeps_charge_density() {
        let incar = Incar::for_job(JobType::SlabStatic);
        assert_eq!(tag(&incar, "NSW"), Some("0"));
        assert_eq!(tag(&incar, "LCHARG"), Some(".TRUE."));
    }
}
