//! # 形状因子表
//!
//! 对每个可用基团、每个 q 网格点预先计算真空形状因子和虚原子形状因子。
//!
//! ## 表来源
//! - 内置默认系数（`group::DEFAULT_COEFFICIENTS`）
//! - 系数文件，每行一个基团:
//!   ```text
//!   # GROUP a1 a2 a3 a4 a5 c b1 b2 b3 b4 b5 volume
//!   C  2.31 1.02 1.5886 0.865 0.0 0.2156 20.8439 10.2075 0.5687 51.6512 0.0 16.44
//!   ```
//!   文件中缺失的复合基团（CH2、NH3 ...）由重原子与氢的系数派生。
//!
//! ## 依赖关系
//! - 被 `saxs/profile.rs` 用于分配每个原子的形状因子
//! - 使用 `saxs/group.rs` 的基团枚举与系数
//! - 使用 `saxs/qgrid.rs` 的 q 网格

use crate::error::{Result, SaxsError};
use crate::saxs::group::{self, FormFactorGroup, ScatteringCoefficients};
use crate::saxs::qgrid::{QGrid, QRange};

use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 每行数值列数: 5 个 a, c, 5 个 b, 体积
const TABLE_COLUMNS: usize = 12;

/// 表来源
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    BuiltIn,
    File(PathBuf),
}

/// 形状因子表
///
/// 行按稠密行号存放，`rows[group.index()]` 给出基团到行号的映射。
/// 构造完成后只读。
#[derive(Debug, Clone)]
pub struct FormFactorTable {
    source: TableSource,
    q_grid: QGrid,
    rows: [Option<usize>; FormFactorGroup::COUNT],
    groups: Vec<FormFactorGroup>,
    coefficients: Vec<ScatteringCoefficients>,
    vacuum: Vec<Vec<f64>>,
    dummy: Vec<Vec<f64>>,
}

impl FormFactorTable {
    /// 从可选系数文件和 q 范围构建；`None` 选择内置默认系数
    pub fn new(path: Option<&Path>, min_q: f64, max_q: f64, delta_q: f64) -> Result<Self> {
        let range = QRange::new(min_q, max_q, delta_q)?;
        match path {
            Some(path) => {
                let coefficients = read_coefficient_file(path)?;
                Ok(Self::from_coefficients(
                    TableSource::File(path.to_path_buf()),
                    &coefficients,
                    QGrid::from_range(range)?,
                ))
            }
            None => Ok(Self::from_coefficients(
                TableSource::BuiltIn,
                &group::DEFAULT_COEFFICIENTS,
                QGrid::from_range(range)?,
            )),
        }
    }

    /// 从系数映射构建，在每个 q 点求值
    pub fn from_coefficients(
        source: TableSource,
        coefficients: &BTreeMap<FormFactorGroup, ScatteringCoefficients>,
        q_grid: QGrid,
    ) -> Self {
        let mut rows = [None; FormFactorGroup::COUNT];
        let mut groups = Vec::with_capacity(coefficients.len());
        let mut coeffs = Vec::with_capacity(coefficients.len());
        let mut vacuum = Vec::with_capacity(coefficients.len());
        let mut dummy = Vec::with_capacity(coefficients.len());

        for (row, (&group, c)) in coefficients.iter().enumerate() {
            rows[group.index()] = Some(row);
            groups.push(group);
            coeffs.push(c.clone());
            vacuum.push(q_grid.values().iter().map(|&q| c.vacuum(q)).collect());
            dummy.push(q_grid.values().iter().map(|&q| c.dummy(q)).collect());
        }

        debug!(
            "form factor table: {} groups x {} q points ({:?})",
            groups.len(),
            q_grid.len(),
            source
        );

        Self {
            source,
            q_grid,
            rows,
            groups,
            coefficients: coeffs,
            vacuum,
            dummy,
        }
    }

    /// 真空形状因子矩阵 [行][q 索引]
    pub fn vacuum_form_factors(&self) -> &[Vec<f64>] {
        &self.vacuum
    }

    /// 虚原子形状因子矩阵 [行][q 索引]
    pub fn dummy_form_factors(&self) -> &[Vec<f64>] {
        &self.dummy
    }

    /// 基团对应的行号；表中不存在时为配置错误
    pub fn row(&self, group: FormFactorGroup) -> Result<usize> {
        self.rows[group.index()].ok_or_else(|| {
            SaxsError::Configuration(format!(
                "group '{}' is not present in the form factor table",
                group
            ))
        })
    }

    pub fn contains(&self, group: FormFactorGroup) -> bool {
        self.rows[group.index()].is_some()
    }

    /// 按行号排列的基团
    pub fn groups(&self) -> &[FormFactorGroup] {
        &self.groups
    }

    pub fn coefficients(&self, group: FormFactorGroup) -> Result<&ScatteringCoefficients> {
        Ok(&self.coefficients[self.row(group)?])
    }

    pub fn num_rows(&self) -> usize {
        self.groups.len()
    }

    pub fn q_grid(&self) -> &QGrid {
        &self.q_grid
    }

    pub fn source(&self) -> &TableSource {
        &self.source
    }

    /// 水分子在 q = 0 处的净形状因子（真空减虚原子）
    pub fn water_form_factor(&self) -> Result<f64> {
        let c = self.coefficients(FormFactorGroup::OH2)?;
        Ok(c.vacuum(0.0) - c.dummy(0.0))
    }
}

/// 读取系数文件
pub fn read_coefficient_file(
    path: &Path,
) -> Result<BTreeMap<FormFactorGroup, ScatteringCoefficients>> {
    let content = fs::read_to_string(path).map_err(|e| SaxsError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_coefficient_table(&content, &path.display().to_string())
}

/// 从字符串内容解析系数表
pub fn parse_coefficient_table(
    content: &str,
    name: &str,
) -> Result<BTreeMap<FormFactorGroup, ScatteringCoefficients>> {
    let mut coefficients = BTreeMap::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(symbol) = parts.next() else {
            continue;
        };

        let Some(group) = FormFactorGroup::from_symbol(symbol) else {
            warn!(
                "{}:{}: unknown group '{}', row ignored",
                name,
                line_no + 1,
                symbol
            );
            continue;
        };

        let values: Vec<f64> = parts
            .map(|s| s.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| SaxsError::ParseError {
                format: "form factor table".to_string(),
                path: name.to_string(),
                reason: format!("line {}: {}", line_no + 1, e),
            })?;

        if values.len() != TABLE_COLUMNS {
            return Err(SaxsError::ParseError {
                format: "form factor table".to_string(),
                path: name.to_string(),
                reason: format!(
                    "line {}: expected {} numeric columns, found {}",
                    line_no + 1,
                    TABLE_COLUMNS,
                    values.len()
                ),
            });
        }

        coefficients.insert(
            group,
            ScatteringCoefficients::new(
                values[0..5].to_vec(),
                values[6..11].to_vec(),
                values[5],
                values[11],
            ),
        );
    }

    if coefficients.is_empty() {
        return Err(SaxsError::Configuration(format!(
            "form factor table '{}' contains no usable rows",
            name
        )));
    }

    group::complete_groups(&mut coefficients);
    Ok(coefficients)
}
