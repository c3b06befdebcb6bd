//! # profile 子命令 CLI 定义
//!
//! 同时定义各子命令共用的 q 范围参数与计算引擎参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/profile.rs`
//! - `QRangeArgs`/`EngineArgs` 也被 rdf、table、compare 子命令复用

use crate::error::Result;
use crate::models::Grouping;
use crate::saxs::{DebyeMethod, FormFactorTable, ProfileOptions, QRange};

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 形状因子系数文件的环境变量
pub const FF_TABLE_ENV: &str = "SAXSKIT_FF_TABLE";

// ─────────────────────────────────────────────────────────────
// 共用参数
// ─────────────────────────────────────────────────────────────

/// q 网格参数
#[derive(Args, Debug, Clone)]
pub struct QRangeArgs {
    /// Minimum q (1/Å)
    #[arg(long, default_value_t = 0.0)]
    pub q_min: f64,

    /// Maximum q (1/Å)
    #[arg(long, default_value_t = 0.5)]
    pub q_max: f64,

    /// q step (1/Å)
    #[arg(long, default_value_t = 0.005)]
    pub q_step: f64,

    /// Compact q grid "min-max:step" (e.g., "0-3:0.01"), overrides --q-min/--q-max/--q-step
    #[arg(long)]
    pub q_range: Option<String>,
}

impl QRangeArgs {
    /// 解析为 q 范围
    pub fn resolve(&self) -> Result<QRange> {
        match &self.q_range {
            Some(compact) => QRange::parse(compact),
            None => QRange::new(self.q_min, self.q_max, self.q_step),
        }
    }
}

/// 原子分组模式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum GroupingArg {
    /// Every atom is its own scatterer, hydrogens included
    #[default]
    #[value(name = "all")]
    All,
    /// Hydrogens merged into their heavy atom (CH2, NH3, OH ...)
    #[value(name = "heavy", alias = "cm")]
    Heavy,
}

impl From<GroupingArg> for Grouping {
    fn from(arg: GroupingArg) -> Self {
        match arg {
            GroupingArg::All => Grouping::AllAtoms,
            GroupingArg::Heavy => Grouping::HeavyAtoms,
        }
    }
}

/// Debye 求和方式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum MethodArg {
    /// Direct sum over atom pairs
    #[default]
    Exact,
    /// Pair distances histogrammed per group pair
    Binned,
}

/// 计算引擎参数
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    #[command(flatten)]
    pub q: QRangeArgs,

    /// Form factor coefficient file (default: built-in table)
    #[arg(long, env = FF_TABLE_ENV)]
    pub ff_table: Option<PathBuf>,

    /// Atom grouping
    #[arg(short, long, value_enum, default_value = "all")]
    pub grouping: GroupingArg,

    /// Debye summation method
    #[arg(short, long, value_enum, default_value = "exact")]
    pub method: MethodArg,

    /// Distance bin width in Å (binned method)
    #[arg(long, default_value_t = 0.5)]
    pub bin_size: f64,

    /// Excluded volume scaling factor
    #[arg(long, default_value_t = 1.0)]
    pub c1: f64,

    /// Hydration layer scaling factor (accepted, no effect)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub c2: f64,
}

impl EngineArgs {
    /// 组装计算参数并校验
    pub fn options(&self) -> Result<ProfileOptions> {
        let method = match self.method {
            MethodArg::Exact => DebyeMethod::Exact,
            MethodArg::Binned => DebyeMethod::Binned {
                bin_size: self.bin_size,
            },
        };
        let options = ProfileOptions {
            grouping: self.grouping.into(),
            method,
            c1: self.c1,
            c2: self.c2,
        };
        options.validate()?;
        Ok(options)
    }

    /// 按 q 范围和系数文件构建形状因子表
    pub fn table(&self) -> Result<FormFactorTable> {
        let range = self.q.resolve()?;
        FormFactorTable::new(
            self.ff_table.as_deref(),
            range.min_q,
            range.max_q,
            range.delta_q,
        )
    }
}

// ─────────────────────────────────────────────────────────────
// profile 子命令
// ─────────────────────────────────────────────────────────────

/// 强度曲线输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ProfileOutputFormat {
    /// CSV data file (q, intensity, partial profiles)
    Csv,
    /// Whitespace-separated q / I(q) file
    Dat,
    /// PNG image of log I(q)
    Png,
    /// SVG vector image of log I(q)
    Svg,
}

impl ProfileOutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ProfileOutputFormat::Csv => "csv",
            ProfileOutputFormat::Dat => "dat",
            ProfileOutputFormat::Png => "png",
            ProfileOutputFormat::Svg => "svg",
        }
    }
}

/// profile 子命令参数
#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Input: structure file (.pdb, .ent, .xyz) or directory of structure files
    pub input: PathBuf,

    /// Output: file path (single mode) or directory (batch mode)
    #[arg(short, long, default_value = "profile.dat")]
    pub output: PathBuf,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<ProfileOutputFormat>,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Also draw the partial profiles (PNG/SVG)
    #[arg(long, default_value_t = false)]
    pub show_partials: bool,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Title for the plot (default: structure name)
    #[arg(long)]
    pub title: Option<String>,

    /// Number of q samples shown in the summary table
    #[arg(long, default_value_t = 10)]
    pub summary_rows: usize,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for input files (batch mode, e.g., "*.pdb,*.xyz")
    #[arg(long, default_value = "*.pdb,*.ent,*.xyz")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
