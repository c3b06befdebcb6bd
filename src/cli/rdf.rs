//! # rdf 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/rdf.rs`

use crate::cli::profile::GroupingArg;

use clap::Args;
use std::path::PathBuf;

/// rdf 子命令参数
#[derive(Args, Debug)]
pub struct RdfArgs {
    /// Input structure file (.pdb, .ent, .xyz)
    pub input: PathBuf,

    /// Output CSV file (r, count)
    #[arg(short, long, default_value = "rdf.csv")]
    pub output: PathBuf,

    /// Distance bin width in Å
    #[arg(short, long, default_value_t = 0.5)]
    pub bin_size: f64,

    /// Cutoff distance in Å (default: structure extent plus one bin)
    #[arg(long)]
    pub max_distance: Option<f64>,

    /// Atom grouping
    #[arg(short, long, value_enum, default_value = "all")]
    pub grouping: GroupingArg,
}
