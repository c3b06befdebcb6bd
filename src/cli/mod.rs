//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `profile`: 计算 SAXS 强度曲线
//! - `rdf`: 导出原子对距离分布
//! - `table`: 输出形状因子表
//! - `compare`: 与参考数据对比
//!
//! 全局参数 `-v`/`--quiet` 控制日志级别。
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: profile, rdf, table, compare

pub mod compare;
pub mod profile;
pub mod rdf;
pub mod table;

use clap::{ArgAction, Parser, Subcommand};

/// saxskit - 小角 X 射线散射强度计算工具箱
#[derive(Parser)]
#[command(name = "saxskit")]
#[command(version)]
#[command(about = "Small-angle X-ray scattering profiles from atomic structures", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Compute the SAXS profile I(q) of a structure file or a directory of structures
    Profile(profile::ProfileArgs),

    /// Export the pair-distance histogram of a structure
    Rdf(rdf::RdfArgs),

    /// Print or export the vacuum/dummy form factor table
    Table(table::TableArgs),

    /// Compute a profile and compare it against reference curves
    Compare(compare::CompareArgs),
}
