//! # 统一错误处理模块
//!
//! 定义 Slabkit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// Slabkit 统一错误类型
#[derive(Error, Debug)]
pub enum SlabkitError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 结构数据库错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid material identifier '{0}' (expected e.g. 'mp-149')")]
    InvalidMaterialId(String),

    #[error("Structure provider error for '{id}': {reason}")]
    ProviderError { id: String, reason: String },

    #[error("External command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // Slab 生成错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid Miller index: {0}")]
    InvalidPlane(String),

    #[error("No symmetric slab exists for plane ({plane}) at min slab size {min_slab_size:.2} Å")]
    SymmetricSlabInfeasible { plane: String, min_slab_size: f64 },

    #[error("Slab generation failed: {0}")]
    SlabGeneration(String),

    // ─────────────────────────────────────────────────────────────
    // 输入文件错误
    // ─────────────────────────────────────────────────────────────
    #[error("POTCAR for '{symbol}' not found under {library}")]
    PotcarNotFound { symbol: String, library: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SlabkitError>;
