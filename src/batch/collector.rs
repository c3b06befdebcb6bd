//! # 文件收集器
//!
//! 根据输入路径和模式收集待处理的结构文件列表。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - 逗号分隔的多个 glob 模式（默认 `*.pdb,*.ent,*.xyz`）
//! - 递归目录搜索
//! - 结果按路径排序，批量输出顺序稳定
//!
//! ## 依赖关系
//! - 被 `commands/profile.rs` 调用
//! - 使用 `walkdir` 遍历目录

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 默认匹配的结构文件
pub const DEFAULT_PATTERNS: [&str; 3] = ["*.pdb", "*.ent", "*.xyz"];

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<String>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: DEFAULT_PATTERNS.iter().map(|s| s.to_string()).collect(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if self.patterns.is_empty() {
            self.patterns = vec!["*".to_string()];
        }
        self
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }

        if !self.input.is_dir() {
            return vec![];
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let walker = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file());

        let mut files: Vec<PathBuf> = walker
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    }

    /// 检查文件是否匹配任一模式
    fn matches_patterns(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        let filename = filename.to_lowercase();
        self.patterns
            .iter()
            .any(|pattern| Self::glob_match(&pattern.to_lowercase(), &filename))
    }

    /// 简单 glob 匹配（支持 * 和 ? 通配符）
    fn glob_match(pattern: &str, text: &str) -> bool {
        let pattern = pattern.as_bytes();
        let text = text.as_bytes();

        let mut p = 0;
        let mut t = 0;
        let mut star_p = None;
        let mut star_t = 0;

        while t < text.len() {
            if p < pattern.len() && (pattern[p] == b'?' || pattern[p] == text[t]) {
                p += 1;
                t += 1;
            } else if p < pattern.len() && pattern[p] == b'*' {
                star_p = Some(p);
                star_t = t;
                p += 1;
            } else if let Some(sp) = star_p {
                p = sp + 1;
                star_t += 1;
                t = star_t;
            } else {
                return false;
            }
        }

        while p < pattern.len() && pattern[p] == b'*' {
            p += 1;
        }

        p == pattern.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_glob_match() {
        assert!(FileCollector::glob_match("*.pdb", "1abc.pdb"));
        assert!(!FileCollector::glob_match("*.pdb", "1abc.xyz"));
        assert!(FileCollector::glob_match("lyso*", "lysozyme.pdb"));
        assert!(FileCollector::glob_match("model?.xyz", "model1.xyz"));
        assert!(!FileCollector::glob_match("model?.xyz", "model12.xyz"));
    }

    #[test]
    fn test_collect_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.pdb"), "").unwrap();
        fs::write(dir.path().join("a.PDB"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.xyz"), "").unwrap();

        let flat = FileCollector::new(dir.path().to_path_buf()).collect();
        let names: Vec<_> = flat
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["a.PDB", "b.pdb"]);

        let deep = FileCollector::new(dir.path().to_path_buf())
            .recursive(true)
            .collect();
        assert_eq!(deep.len(), 3);

        let only_xyz = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.xyz")
            .recursive(true)
            .collect();
        assert_eq!(only_xyz.len(), 1);
    }
}
