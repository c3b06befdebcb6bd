//! # PDB 格式解析器
//!
//! 解析 PDB 文件中的 `ATOM`/`HETATM` 记录（固定列宽）。
//!
//! ## PDB 列定义（1 起始）
//! ```text
//!  1- 6  记录名 ATOM/HETATM
//! 13-16  原子名
//! 18-20  残基名
//! 31-38  x (Å)
//! 39-46  y (Å)
//! 47-54  z (Å)
//! 77-78  元素符号
//! ```
//! 只读取第一个 MODEL；元素列缺失时由原子名推断。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{Result, SaxsError};
use crate::models::AtomRecord;
use std::fs;
use std::path::Path;

/// 解析 PDB 文件
pub fn parse_pdb_file(path: &Path) -> Result<Vec<AtomRecord>> {
    let content = fs::read_to_string(path).map_err(|e| SaxsError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_pdb_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 PDB 格式
pub fn parse_pdb_content(content: &str, name: &str) -> Result<Vec<AtomRecord>> {
    let mut atoms = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        if line.starts_with("ENDMDL") {
            break;
        }
        if !(line.starts_with("ATOM") || line.starts_with("HETATM")) {
            continue;
        }

        let parse_error = |reason: String| SaxsError::ParseError {
            format: "pdb".to_string(),
            path: name.to_string(),
            reason: format!("line {}: {}", line_no + 1, reason),
        };

        let coord = |start: usize, end: usize, axis: &str| -> Result<f64> {
            column(line, start, end)
                .parse::<f64>()
                .map_err(|_| parse_error(format!("invalid {} coordinate", axis)))
        };

        let position = [
            coord(30, 38, "x")?,
            coord(38, 46, "y")?,
            coord(46, 54, "z")?,
        ];

        let atom_name = column(line, 12, 16).to_string();
        let residue = column(line, 17, 20).to_string();
        let element = match column(line, 76, 78) {
            "" => element_from_atom_name(&atom_name),
            symbol => normalize_symbol(symbol),
        };

        if element.is_empty() {
            return Err(parse_error(format!(
                "cannot determine element of atom '{}'",
                atom_name
            )));
        }

        atoms.push(AtomRecord {
            name: atom_name,
            residue,
            element,
            position,
        });
    }

    if atoms.is_empty() {
        return Err(SaxsError::ParseError {
            format: "pdb".to_string(),
            path: name.to_string(),
            reason: "no ATOM/HETATM records found".to_string(),
        });
    }

    Ok(atoms)
}

/// 取固定列并去除空白；行太短时返回空串
fn column(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start..end).map(str::trim).unwrap_or("")
}

/// 元素符号规范化: "FE" -> "Fe"
fn normalize_symbol(symbol: &str) -> String {
    let mut chars = symbol.trim().chars().filter(|c| c.is_ascii_alphabetic());
    match chars.next() {
        Some(first) => {
            let rest: String = chars.map(|c| c.to_ascii_lowercase()).collect();
            format!("{}{}", first.to_ascii_uppercase(), rest)
        }
        None => String::new(),
    }
}

/// 从原子名推断元素：取第一个字母（蛋白质原子名约定）
fn element_from_atom_name(atom_name: &str) -> String {
    atom_name
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}
