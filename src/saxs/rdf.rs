//! # 径向分布函数 (RDF)
//!
//! 固定宽度的原子对距离直方图。将 Debye 求和中与 q 相关的核函数
//! sin(qr)/(qr) 的计算从 O(N²·Q) 降为 O(bins·Q)。
//!
//! ## 约定
//! - nbins = floor(max_distance / bin_size) + 1
//! - d < max_distance 时落入 floor(d / bin_size) 号箱
//! - d >= max_distance 的样本直接丢弃（不是错误）
//! - 箱数超过 `qgrid::MAX_SAMPLES` 时构造失败
//!
//! ## 依赖关系
//! - 被 `saxs/profile.rs` 的分箱 Debye 求和使用
//! - 被 `commands/rdf.rs` 导出原子对距离分布
//! - 使用 `rayon` 并行累加

use crate::error::{Result, SaxsError};
use crate::saxs::qgrid::sample_count;

use rayon::prelude::*;

/// 径向分布函数
#[derive(Debug, Clone, PartialEq)]
pub struct RadialDistributionFunction {
    bin_size: f64,
    max_distance: f64,
    values: Vec<f64>,
}

impl RadialDistributionFunction {
    /// 创建空的 RDF
    pub fn new(bin_size: f64, max_distance: f64) -> Result<Self> {
        if !(bin_size.is_finite() && bin_size > 0.0) {
            return Err(SaxsError::Configuration(format!(
                "RDF bin size must be > 0, got {}",
                bin_size
            )));
        }
        if !(max_distance.is_finite() && max_distance > 0.0) {
            return Err(SaxsError::Configuration(format!(
                "RDF max distance must be > 0, got {}",
                max_distance
            )));
        }
        let nbins = sample_count("RDF", max_distance, bin_size)?;
        Ok(Self {
            bin_size,
            max_distance,
            values: vec![0.0; nbins],
        })
    }

    /// 箱数
    pub fn nbins(&self) -> usize {
        self.values.len()
    }

    pub fn bin_size(&self) -> f64 {
        self.bin_size
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// 当前各箱累计值
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 清零所有箱，不重新分配
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    /// 距离对应的箱号；超出截断距离时返回 None
    pub fn bin_index(&self, distance: f64) -> Option<usize> {
        // NaN 比较为 false，也会被丢弃
        if !(distance >= 0.0 && distance < self.max_distance) {
            return None;
        }
        let index = (distance / self.bin_size).floor() as usize;
        Some(index.min(self.nbins() - 1))
    }

    /// 箱中心距离
    pub fn bin_center(&self, index: usize) -> f64 {
        (index as f64 + 0.5) * self.bin_size
    }

    /// 加入一个带权重的距离样本；被丢弃时返回 false
    pub fn add_to_distribution(&mut self, distance: f64, weight: f64) -> bool {
        match self.bin_index(distance) {
            Some(index) => {
                self.values[index] += weight;
                true
            }
            None => false,
        }
    }

    /// 加入一个计数为 1 的距离样本
    pub fn add_distance(&mut self, distance: f64) -> bool {
        self.add_to_distribution(distance, 1.0)
    }

    /// 合并另一个同规格的 RDF（并行累加后的归并）
    pub fn merge(&mut self, other: &RadialDistributionFunction) -> Result<()> {
        if other.nbins() != self.nbins() {
            return Err(SaxsError::shape("RDF bins", self.nbins(), other.nbins()));
        }
        self.absorb(other);
        Ok(())
    }

    /// 逐箱相加；调用方保证两者箱数相同
    pub(crate) fn absorb(&mut self, other: &RadialDistributionFunction) {
        debug_assert_eq!(self.nbins(), other.nbins());
        for (a, b) in self.values.iter_mut().zip(other.values.iter()) {
            *a += b;
        }
    }

    /// 非零箱的 (箱中心距离, 累计值)
    pub fn occupied_bins(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, &v)| (self.bin_center(i), v))
            .collect()
    }

    /// 所有箱的累计值之和
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// 对一组坐标的全部无序原子对 (i < j) 做计数直方图
    ///
    /// 按行并行，每个工作线程持有独立的直方图，最后求和归并。
    pub fn accumulate_pairs(&mut self, positions: &[[f64; 3]]) {
        let empty = {
            let mut e = self.clone();
            e.reset();
            e
        };

        let partial = (0..positions.len())
            .into_par_iter()
            .fold(
                || empty.clone(),
                |mut acc, i| {
                    for j in (i + 1)..positions.len() {
                        acc.add_distance(distance(&positions[i], &positions[j]));
                    }
                    acc
                },
            )
            .reduce(
                || empty.clone(),
                |mut a, b| {
                    a.absorb(&b);
                    a
                },
            );

        self.absorb(&partial);
    }
}

/// 两点欧氏距离
pub fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}
