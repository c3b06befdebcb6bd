//! # compare 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/compare.rs`

use crate::cli::profile::EngineArgs;
use crate::saxs::reference::{VacDumConvention, DEFAULT_ATOL, DEFAULT_RTOL};

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// compare 子命令参数
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Input structure file (.pdb, .ent, .xyz)
    pub input: PathBuf,

    /// Directory with reference curves (q, vac_vac, dum_dum, vac_dum, intensity)
    #[arg(short, long)]
    pub reference: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Relative tolerance
    #[arg(long, default_value_t = DEFAULT_RTOL)]
    pub rtol: f64,

    /// Absolute tolerance
    #[arg(long, default_value_t = DEFAULT_ATOL)]
    pub atol: f64,

    /// Convention of the reference vac_dum curve
    #[arg(long, value_enum, default_value = "engine")]
    pub vac_dum_convention: VacDumConventionArg,

    /// Write the computed curves as a new reference set instead of comparing
    #[arg(long, default_value_t = false)]
    pub save: bool,
}

/// 参考集 vac_dum 约定
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum VacDumConventionArg {
    /// Same definition as this program (reference sets written with --save)
    #[default]
    Engine,
    /// IMP / libsaxs files, which store twice the cross term
    #[value(name = "imp", alias = "libsaxs")]
    Imp,
}

impl From<VacDumConventionArg> for VacDumConvention {
    fn from(arg: VacDumConventionArg) -> Self {
        match arg {
            VacDumConventionArg::Engine => VacDumConvention::Engine,
            VacDumConventionArg::Imp => VacDumConvention::Imp,
        }
    }
}
