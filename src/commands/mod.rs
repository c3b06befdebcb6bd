//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `saxs/`, `batch/`, `utils/`
//! - 子模块: profile, rdf, table, compare

pub mod compare;
pub mod profile;
pub mod rdf;
pub mod table;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Profile(args) => profile::execute(args),
        Commands::Rdf(args) => rdf::execute(args),
        Commands::Table(args) => table::execute(args),
        Commands::Compare(args) => compare::execute(args),
    }
}
