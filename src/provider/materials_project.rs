//! # Materials Project 结构获取
//!
//! 通过 `curl` 调用 Materials Project REST API (`/materials/summary/`)，
//! 读取 `structure`（pymatgen 字典格式）与 `symmetry.symbol`。
//!
//! ## 环境变量
//! - `MP_API_KEY`: API 密钥（CLI 也可通过 `--api-key` 传入）
//! - `MP_API_ENDPOINT`: 覆盖默认地址 `https://api.materialsproject.org`
//!
//! ## 依赖关系
//! - 被 `provider/mod.rs` 导出，`commands/` 使用
//! - 使用 `parsers/pmg_json.rs`, `serde_json`

use super::{validate_material_id, StructureProvider};
use crate::error::{Result, SlabkitError};
use crate::models::Crystal;
use crate::parsers::pmg_json::PmgStructure;

use serde::Deserialize;
use std::ffi::OsStr;
use std::io::Write;
use std::process::{Command, Stdio};

pub const DEFAULT_ENDPOINT: &str = "https://api.materialsproject.org";

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    data: Vec<SummaryDoc>,
}

#[derive(Debug, Deserialize)]
struct SummaryDoc {
    #[serde(default)]
    material_id: Option<String>,
    structure: PmgStructure,
    #[serde(default)]
    symmetry: Option<SymmetryDoc>,
}

#[derive(Debug, Deserialize)]
struct SymmetryDoc {
    #[serde(default)]
    symbol: Option<String>,
}

/// Materials Project 客户端
#[derive(Debug, Clone)]
pub struct MaterialsProject {
    api_key: String,
    endpoint: String,
}

impl MaterialsProject {
    /// 端点默认为官方地址，可由 `MP_API_ENDPOINT` 覆盖
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = MaterialsProject {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        };
        match std::env::var("MP_API_ENDPOINT") {
            Ok(endpoint) if !endpoint.trim().is_empty() => client.with_endpoint(endpoint),
            _ => client,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn summary_url(&self) -> String {
        format!("{}/materials/summary/", self.endpoint.trim_end_matches('/'))
    }

    /// 执行请求，返回 (HTTP 状态码, 响应体)
    fn request(&self, id: &str) -> Result<(u16, String)> {
        self.request_with(OsStr::new("curl"), id)
    }

    /// API 密钥经 stdin (`-H @-`) 交给 curl，不出现在进程参数里
    fn request_with(&self, curl: &OsStr, id: &str) -> Result<(u16, String)> {
        let mut child = Command::new(curl)
            .args(["-sS", "-G", &self.summary_url()])
            .args(["--data-urlencode", &format!("material_ids={}", id)])
            .args(["--data-urlencode", "_fields=material_id,structure,symmetry"])
            .args(["-H", "@-"])
            .args(["-H", "accept: application/json"])
            .args(["-w", "\n%{http_code}"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|_| SlabkitError::CommandNotFound {
                command: "curl".to_string(),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(format!("X-API-KEY: {}\n", self.api_key).as_bytes())
                .map_err(|e| SlabkitError::CommandFailed {
                    command: "curl".to_string(),
                    stderr: e.to_string(),
                })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| SlabkitError::CommandFailed {
                command: "curl".to_string(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(SlabkitError::CommandFailed {
                command: "curl".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        split_status(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            SlabkitError::ProviderError {
                id: id.to_string(),
                reason: "malformed response from curl".to_string(),
            }
        })
    }
}

/// 拆分 `-w "\n%{http_code}"` 追加的状态码
fn split_status(raw: &str) -> Option<(u16, String)> {
    let (body, code) = raw.trim_end().rsplit_once('\n')?;
    Some((code.trim().parse().ok()?, body.to_string()))
}

/// 解析 summary 响应体
fn parse_summary(id: &str, status: u16, body: &str) -> Result<Crystal> {
    if status != 200 {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").map(|d| d.to_string()))
            .unwrap_or_else(|| body.chars().take(200).collect());
        return Err(SlabkitError::ProviderError {
            id: id.to_string(),
            reason: format!("HTTP {}: {}", status, detail),
        });
    }

    let response: SummaryResponse = serde_json::from_str(body)?;
    let doc = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| SlabkitError::ProviderError {
            id: id.to_string(),
            reason: "no structure returned".to_string(),
        })?;

    let name = doc.material_id.unwrap_or_else(|| id.to_string());
    let mut crystal = doc.structure.into_crystal(&name)?;
    crystal.space_group = doc.symmetry.and_then(|s| s.symbol);
    crystal.source = Some(format!("materials-project:{}", id));
    Ok(crystal)
}

impl StructureProvider for MaterialsProject {
    fn fetch(&self, id: &str) -> Result<Crystal> {
        let id = id.trim();
        validate_material_id(id)?;
        if self.api_key.trim().is_empty() {
            return Err(SlabkitError::ProviderError {
                id: id.to_string(),
                reason: "no API key (set MP_API_KEY or pass --api-key)".to_string(),
            });
        }

        let (status, body) = self.request(id)?;
        parse_summary(id, status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "data": [{
            "material_id": "mp-149",
            "structure": {
                "lattice": {"matrix": [[0.0, 2.73, 2.73], [2.73, 0.0, 2.73], [2.73, 2.73, 0.0]]},
                "sites": [
                    {"species": [{"element": "Si", "occu": 1}], "abc": [0.875, 0.875, 0.875]},
                    {"species": [{"element": "Si", "occu": 1}], "abc": [0.125, 0.125, 0.125]}
                ]
            },
            "symmetry": {"crystal_system": "Cubic", "symbol": "Fd-3m", "number": 227}
        }],
        "meta": {"total_doc": 1}
    }"#;

    #[test]
    fn test_parse_summary() {
        let crystal = parse_summary("mp-149", 200, RESPONSE).unwrap();
        assert_eq!(crystal.name, "mp-149");
        assert_eq!(crystal.num_sites(), 2);
        assert_eq!(crystal.space_group.as_deref(), Some("Fd-3m"));
    }

    #[test]
    fn test_parse_summary_errors() {
        let empty = r#"{"data": [], "meta": {}}"#;
        assert!(matches!(
            parse_summary("mp-0", 200, empty),
            Err(SlabkitError::ProviderError { .. })
        ));

        let denied = r#"{"detail": "Invalid API key"}"#;
        match parse_summary("mp-149", 401, denied) {
            Err(SlabkitError::ProviderError { reason, .. }) => assert!(reason.contains("401")),
            other => panic!("unexpected: {:?}", other.map(|c| c.name)),
        }
    }

    #[test]
    fn test_split_status() {
        let (code, body) = split_status("{\"data\": []}\n200").unwrap();
        assert_eq!(code, 200);
        assert_eq!(body, "{\"data\": []}");
        assert!(split_status("no status").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_api_key_not_passed_as_argument() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let argv_file = dir.path().join("argv");
        let stdin_file = dir.path().join("stdin");
        let script = dir.path().join("curl");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\ncat > '{}'\nprintf '{{\"data\": []}}\\n200'\n",
                argv_file.display(),
                stdin_file.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let client = MaterialsProject::new("SECRET-KEY-123");
        let (status, body) = client.request_with(script.as_os_str(), "mp-149").unwrap();
        assert_eq!(status, 200);
        assert!(matches!(
            parse_summary("mp-149", status, &body),
            Err(SlabkitError::ProviderError { .. })
        ));

        let argv = std::fs::read_to_string(&argv_file).unwrap();
        assert!(argv.contains("material_ids=mp-149"));
        assert!(!argv.contains("SECRET-KEY-123"));
        let header = std::fs::read_to_string(&stdin_file).unwrap();
        assert_eq!(header.trim_end(), "X-API-KEY: SECRET-KEY-123");
    }

    #[test]
    fn test_invalid_id_rejected_before_request() {
        let client = MaterialsProject::new("key").with_endpoint("http://127.0.0.1:9");
        assert!(matches!(
            client.fetch("silicon"),
            Err(SlabkitError::InvalidMaterialId(_))
        ));
    }
}
