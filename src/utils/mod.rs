//! # 工具函数模块
//!
//! 提供美化输出、进度条和日志桥接。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块和 `main.rs` 使用
//! - 子模块: logger, output, progress

pub mod logger;
pub mod output;
pub mod progress;
