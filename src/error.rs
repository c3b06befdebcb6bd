//! # 统一错误处理模块
//!
//! 定义 saxskit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - `Configuration`: q 范围非法、形状因子表缺少某个基团（致命，不重试）
//! - `ShapeMismatch`: 原子数、形状因子表宽度、q 网格长度之间不一致（调用方误用）
//! - `InvalidGeometry`: 坐标中出现 NaN/Inf 等退化几何
//!
//! 计算本身是纯函数且确定，不存在可重试的瞬时错误。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// saxskit 统一错误类型
#[derive(Error, Debug)]
pub enum SaxsError {
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
    // 计算引擎错误
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    // ─────────────────────────────────────────────────────────────
    // 参考数据对比
    // ─────────────────────────────────────────────────────────────
    #[error("Reference mismatch in '{curve}': max deviation {max_deviation:.3e} at index {index}")]
    ReferenceMismatch {
        curve: String,
        index: usize,
        max_deviation: f64,
    },

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl SaxsError {
    /// 构造形状不匹配错误
    pub fn shape(what: impl Into<String>, expected: usize, found: usize) -> Self {
        SaxsError::ShapeMismatch {
            what: what.into(),
            expected,
            found,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SaxsError>;
