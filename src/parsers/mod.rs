//! # 解析器模块
//!
//! 提供结构文件的解析器，输出原始原子记录，再按分组模式构建粒子。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: pdb, xyz

pub mod pdb;
pub mod xyz;

use crate::error::{Result, SaxsError};
use crate::models::{Grouping, Particle};
use std::path::Path;

/// 从文件路径推断格式并解析为粒子
pub fn parse_structure_file(path: &Path, grouping: Grouping) -> Result<Particle> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let records = match ext.as_str() {
        "pdb" | "ent" => pdb::parse_pdb_file(path)?,
        "xyz" => xyz::parse_xyz_file(path)?,
        _ => {
            return Err(SaxsError::UnsupportedFormat(format!(
                "Cannot determine format for: {}",
                path.display()
            )))
        }
    };

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");

    Particle::from_records(name, &records, grouping)
}
