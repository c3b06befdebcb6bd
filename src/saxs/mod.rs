//! # SAXS 计算模块
//!
//! 由原子结构计算小角 X 射线散射强度曲线 I(q)。
//!
//! ## 子模块
//! - `group`: 形状因子基团与散射系数
//! - `qgrid`: q 网格
//! - `table`: 形状因子表
//! - `rdf`: 原子对距离直方图
//! - `profile`: 部分曲线与强度计算
//! - `export`: 数据导出
//! - `plot`: 图表生成
//! - `reference`: 参考数据对比
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/structure.rs`

pub mod export;
pub mod group;
pub mod plot;
pub mod profile;
pub mod qgrid;
pub mod rdf;
pub mod reference;
pub mod table;

pub use group::{FormFactorGroup, ScatteringCoefficients};
pub use profile::{
    assign_form_factors, calculate_profile_partial, calculate_profile_partial_with,
    compute_profile, DebyeMethod, PartialProfile, Profile, ProfileOptions,
};
pub use qgrid::{QGrid, QRange};
pub use rdf::RadialDistributionFunction;
pub use reference::{all_close, ReferenceSet, VacDumConvention};
pub use table::{FormFactorTable, TableSource};
