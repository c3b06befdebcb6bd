//! # q 网格
//!
//! 散射矢量模长 q 的均匀离散网格：qᵢ = min_q + i·Δq，
//! i = 0 ..= floor((max_q - min_q) / Δq)。
//!
//! 网格点数和 RDF 箱数都不超过 `MAX_SAMPLES`，超出时构造返回 `Configuration` 错误。
//!
//! ## 依赖关系
//! - 被 `saxs/table.rs` 和 `saxs/profile.rs` 使用

use crate::error::{Result, SaxsError};

use serde::{Deserialize, Serialize};

/// 浮点除法取整时的容差，避免 3.0/0.01 落到 299.999...
const STEP_EPSILON: f64 = 1e-9;

/// 单个网格或直方图允许的最大采样数
pub const MAX_SAMPLES: usize = 10_000_000;

/// 计算 floor(span / step) + 1，对舍入误差做容差处理；结果非有限或超过上限时报错
pub(crate) fn sample_count(what: &str, span: f64, step: f64) -> Result<usize> {
    let too_many = || {
        SaxsError::Configuration(format!(
            "{} would need more than {} samples (span {}, step {})",
            what, MAX_SAMPLES, span, step
        ))
    };

    let steps = (span / step + STEP_EPSILON).floor();
    if !steps.is_finite() || steps < 0.0 || steps >= MAX_SAMPLES as f64 {
        return Err(too_many());
    }
    (steps as usize)
        .checked_add(1)
        .filter(|&n| n <= MAX_SAMPLES)
        .ok_or_else(too_many)
}

/// q 范围描述 (Å⁻¹)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QRange {
    pub min_q: f64,
    pub max_q: f64,
    pub delta_q: f64,
}

impl QRange {
    /// 创建并校验 q 范围
    pub fn new(min_q: f64, max_q: f64, delta_q: f64) -> Result<Self> {
        if !(min_q.is_finite() && max_q.is_finite() && delta_q.is_finite()) {
            return Err(SaxsError::Configuration(format!(
                "q range must be finite (min={}, max={}, step={})",
                min_q, max_q, delta_q
            )));
        }
        if min_q < 0.0 {
            return Err(SaxsError::Configuration(format!(
                "min_q must be >= 0, got {}",
                min_q
            )));
        }
        if max_q <= min_q {
            return Err(SaxsError::Configuration(format!(
                "max_q ({}) must be greater than min_q ({})",
                max_q, min_q
            )));
        }
        if delta_q <= 0.0 {
            return Err(SaxsError::Configuration(format!(
                "delta_q must be > 0, got {}",
                delta_q
            )));
        }
        let range = Self {
            min_q,
            max_q,
            delta_q,
        };
        range.len()?;
        Ok(range)
    }

    /// 网格点数
    pub fn len(&self) -> Result<usize> {
        sample_count("q grid", self.max_q - self.min_q, self.delta_q)
    }

    /// 解析紧凑格式 "min-max:step"，如 "0-3:0.01"
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || SaxsError::InvalidRange(format!("{} (expected 'min-max:step')", input));

        let (span, step) = input.split_once(':').ok_or_else(invalid)?;
        let (min, max) = span.split_once('-').ok_or_else(invalid)?;

        let min: f64 = min.trim().parse().map_err(|_| invalid())?;
        let max: f64 = max.trim().parse().map_err(|_| invalid())?;
        let step: f64 = step.trim().parse().map_err(|_| invalid())?;

        Self::new(min, max, step)
    }
}

/// 离散 q 网格（构造后不可变）
#[derive(Debug, Clone, PartialEq)]
pub struct QGrid {
    range: QRange,
    values: Vec<f64>,
}

impl QGrid {
    /// 从 (min_q, max_q, delta_q) 创建
    pub fn new(min_q: f64, max_q: f64, delta_q: f64) -> Result<Self> {
        Self::from_range(QRange::new(min_q, max_q, delta_q)?)
    }

    /// 从范围创建；点数超过 `MAX_SAMPLES` 时返回错误
    pub fn from_range(range: QRange) -> Result<Self> {
        let values = (0..range.len()?)
            .map(|i| range.min_q + i as f64 * range.delta_q)
            .collect();
        Ok(Self { range, values })
    }

    pub fn range(&self) -> QRange {
        self.range
    }

    /// 全部 q 值
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_length_and_spacing() {
        let grid = QGrid::new(0.0, 3.0, 0.01).unwrap();
        assert_eq!(grid.len(), 301);

        let q = grid.values();
        assert_eq!(q[0], 0.0);
        assert!((q[300] - 3.0).abs() < 1e-9);
        for w in q.windows(2) {
            assert!(w[1] > w[0]);
            assert!((w[1] - w[0] - 0.01).abs() < 1e-9);
        }
    }

    #[test]
    fn test_grid_partial_last_step() {
        // floor((0.5 - 0.1) / 0.15) + 1 = 3
        let grid = QGrid::new(0.1, 0.5, 0.15).unwrap();
        assert_eq!(grid.len(), 3);
        assert!((grid.values()[2] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(matches!(
            QRange::new(-0.1, 1.0, 0.1),
            Err(SaxsError::Configuration(_))
        ));
        assert!(matches!(
            QRange::new(1.0, 1.0, 0.1),
            Err(SaxsError::Configuration(_))
        ));
        assert!(matches!(
            QRange::new(0.0, 1.0, 0.0),
            Err(SaxsError::Configuration(_))
        ));
        assert!(matches!(
            QRange::new(0.0, f64::NAN, 0.1),
            Err(SaxsError::Configuration(_))
        ));
    }

    #[test]
    fn test_oversized_grid_is_configuration_error() {
        assert!(matches!(
            QGrid::new(0.0, 1e300, 1e-300),
            Err(SaxsError::Configuration(_))
        ));
        assert!(matches!(
            QRange::new(0.0, 3.0, 1e-12),
            Err(SaxsError::Configuration(_))
        ));

        // 绕过 new() 直接构造的范围也在建网格时被拒绝
        let range = QRange {
            min_q: 0.0,
            max_q: f64::MAX,
            delta_q: f64::MIN_POSITIVE,
        };
        assert!(matches!(
            QGrid::from_range(range),
            Err(SaxsError::Configuration(_))
        ));
    }

    #[test]
    fn test_sample_count_cap() {
        assert_eq!(sample_count("x", 3.0, 0.01).unwrap(), 301);
        assert_eq!(sample_count("x", (MAX_SAMPLES - 1) as f64, 1.0).unwrap(), MAX_SAMPLES);
        assert!(sample_count("x", MAX_SAMPLES as f64, 1.0).is_err());
        assert!(sample_count("x", f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_parse_compact_range() {
        let r = QRange::parse("0-3:0.01").unwrap();
        assert_eq!(r.min_q, 0.0);
        assert_eq!(r.max_q, 3.0);
        assert_eq!(r.delta_q, 0.01);
        assert!(QRange::parse("0-3").is_err());
        assert!(QRange::parse("a-3:0.1").is_err());
    }
}
