//! # table 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/table.rs`

use crate::cli::profile::{QRangeArgs, FF_TABLE_ENV};

use clap::Args;
use std::path::PathBuf;

/// table 子命令参数
#[derive(Args, Debug)]
pub struct TableArgs {
    #[command(flatten)]
    pub q: QRangeArgs,

    /// Form factor coefficient file (default: built-in table)
    #[arg(long, env = FF_TABLE_ENV)]
    pub ff_table: Option<PathBuf>,

    /// Only show these groups (comma-separated, e.g., "C,CH2,OH")
    #[arg(long)]
    pub groups: Option<String>,

    /// Write the full table as CSV (group, q, vacuum, dummy) instead of printing a summary
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
