//! # saxskit - 小角 X 射线散射强度计算工具箱
//!
//! 由原子坐标和形状因子表，用 Debye 公式计算 SAXS 强度曲线 I(q)，
//! 并提供部分曲线导出、绘图和参考数据对比。
//!
//! ## 子命令
//! - `profile` - 计算强度曲线（单文件或批量目录）
//! - `rdf`     - 导出原子对距离分布
//! - `table`   - 输出形状因子表
//! - `compare` - 与参考数据对比
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (结构解析器)
//!   │     ├── saxs/      (计算引擎)
//!   │     ├── batch/     (批量处理)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (输出、进度条、日志)
//!   └── error.rs    (错误处理)
//! ```

pub mod batch;
pub mod cli;
pub mod commands;
pub mod error;
pub mod models;
pub mod parsers;
pub mod saxs;
pub mod utils;

pub use error::{Result, SaxsError};
pub use models::{Atom, AtomRecord, Grouping, Particle};
