//! # XYZ 格式解析器
//!
//! ## XYZ 格式说明
//! ```text
//! 3                      # 原子数
//! water                  # 注释行（结构名称）
//! O   0.000  0.000  0.117
//! H   0.000  0.757 -0.467
//! H   0.000 -0.757 -0.467
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{Result, SaxsError};
use crate::models::AtomRecord;
use std::fs;
use std::path::Path;

/// 解析 XYZ 文件
pub fn parse_xyz_file(path: &Path) -> Result<Vec<AtomRecord>> {
    let content = fs::read_to_string(path).map_err(|e| SaxsError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_xyz_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 XYZ 格式（只读第一帧）
pub fn parse_xyz_content(content: &str, name: &str) -> Result<Vec<AtomRecord>> {
    let parse_error = |reason: String| SaxsError::ParseError {
        format: "xyz".to_string(),
        path: name.to_string(),
        reason,
    };

    let mut lines = content.lines();
    let count: usize = lines
        .next()
        .and_then(|l| l.trim().parse().ok())
        .ok_or_else(|| parse_error("first line must be the atom count".to_string()))?;

    // 注释行
    lines.next();

    let mut atoms = Vec::with_capacity(count);
    for (i, line) in lines.take(count).enumerate() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(parse_error(format!("atom line {} is incomplete", i + 1)));
        }
        let mut position = [0.0; 3];
        for k in 0..3 {
            position[k] = parts[k + 1]
                .parse()
                .map_err(|_| parse_error(format!("invalid coordinate on atom line {}", i + 1)))?;
        }
        atoms.push(AtomRecord::new(parts[0], position));
    }

    if atoms.len() != count {
        return Err(parse_error(format!(
            "expected {} atoms, found {}",
            count,
            atoms.len()
        )));
    }

    Ok(atoms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_water() {
        let content = "3\nwater\nO 0.0 0.0 0.117\nH 0.0 0.757 -0.467\nH 0.0 -0.757 -0.467\n";
        let atoms = parse_xyz_content(content, "water").unwrap();
        assert_eq!(atoms.len(), 3);
        assert_eq!(atoms[0].element, "O");
        assert!((atoms[1].position[1] - 0.757).abs() < 1e-12);
    }

    #[test]
    fn test_truncated_file() {
        let content = "3\nwater\nO 0.0 0.0 0.117\n";
        assert!(parse_xyz_content(content, "water").is_err());
    }
}
