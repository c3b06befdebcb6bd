//! # 参考数据对比
//!
//! 从目录中读取参考曲线，与引擎输出逐元素比较。
//!
//! ## 目录布局
//! 每条曲线一个文件，每行一个数值:
//! ```text
//! reference/
//!   q          q 网格
//!   vacuum     第一个原子的真空形状因子（可选）
//!   dummy      第一个原子的虚原子形状因子（可选）
//!   vac_vac    部分曲线
//!   dum_dum
//!   vac_dum
//!   intensity  c1/c2 组合后的强度
//! ```
//!
//! 判据: |a - b| <= atol + rtol·|b|（b 为参考值）
//!
//! ## vac_dum 约定
//! 本引擎的 vd = Σ vᵢdᵢ + Σ_{i<j}(vᵢdⱼ + vⱼdᵢ)·sinc，I = vv - 2·c1·vd + c1²·dd。
//! IMP / libsaxs 保存的 vac_dum 是它的两倍（I = vv + dd - vd），
//! 读取时用 `VacDumConvention::Imp` 折算。写出的参考集总是本引擎约定。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 和集成测试使用
//! - 使用 `saxs/export.rs` 读写单列曲线

use crate::error::{Result, SaxsError};
use crate::saxs::export::{read_curve, write_curve};
use crate::saxs::profile::{PartialProfile, Profile};

use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// 默认相对容差
pub const DEFAULT_RTOL: f64 = 1e-5;

/// 默认绝对容差
pub const DEFAULT_ATOL: f64 = 1e-8;

/// 逐元素判断 |a - b| <= atol + rtol·|b|；长度不同时为 false
pub fn all_close(a: &[f64], b: &[f64], rtol: f64, atol: f64) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x - y).abs() <= atol + rtol * y.abs())
}

/// 参考文件中 vac_dum 曲线的约定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VacDumConvention {
    /// 与本引擎相同
    #[default]
    Engine,
    /// IMP / libsaxs，文件中为本引擎值的两倍
    Imp,
}

impl VacDumConvention {
    /// 文件值折算为本引擎约定的系数
    pub fn scale(self) -> f64 {
        match self {
            Self::Engine => 1.0,
            Self::Imp => 0.5,
        }
    }
}

/// 一组参考曲线
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSet {
    pub q: Vec<f64>,
    pub vacuum: Option<Vec<f64>>,
    pub dummy: Option<Vec<f64>>,
    pub partials: [Vec<f64>; PartialProfile::COUNT],
    pub intensity: Vec<f64>,
}

/// 单条曲线的对比结果
#[derive(Debug, Clone, Serialize)]
pub struct CurveComparison {
    pub curve: String,
    pub samples: usize,
    /// 最大绝对偏差
    pub max_deviation: f64,
    /// 最大偏差所在索引
    pub index: usize,
    pub passed: bool,
}

impl ReferenceSet {
    /// 从引擎输出构建；形状因子曲线取第一个原子
    pub fn from_profile(profile: &Profile, intensity: &[f64]) -> Self {
        Self {
            q: profile.all_q().to_vec(),
            vacuum: profile.vacuum_ff().first().cloned(),
            dummy: profile.dummy_ff().first().cloned(),
            partials: profile.partial_profiles().clone(),
            intensity: intensity.to_vec(),
        }
    }

    /// 从目录读取；`vacuum` 和 `dummy` 缺失时为 None，vac_dum 按 `convention` 折算
    pub fn load(dir: &Path, convention: VacDumConvention) -> Result<Self> {
        if !dir.is_dir() {
            return Err(SaxsError::FileNotFound {
                path: dir.display().to_string(),
            });
        }

        let optional = |name: &str| -> Result<Option<Vec<f64>>> {
            let path = dir.join(name);
            if path.exists() {
                read_curve(&path).map(Some)
            } else {
                Ok(None)
            }
        };

        let scale = convention.scale();
        let vac_dum = read_curve(&dir.join(PartialProfile::VacDum.label()))?
            .into_iter()
            .map(|v| v * scale)
            .collect();

        let set = Self {
            q: read_curve(&dir.join("q"))?,
            vacuum: optional("vacuum")?,
            dummy: optional("dummy")?,
            partials: [
                read_curve(&dir.join(PartialProfile::VacVac.label()))?,
                read_curve(&dir.join(PartialProfile::DumDum.label()))?,
                vac_dum,
            ],
            intensity: read_curve(&dir.join("intensity"))?,
        };
        debug!(
            "loaded reference set from {} ({} q points, {:?} vac_dum)",
            dir.display(),
            set.q.len(),
            convention
        );
        Ok(set)
    }

    /// 以本引擎约定写入目录（不存在时创建）
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| SaxsError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;

        write_curve(&self.q, &dir.join("q"))?;
        if let Some(vacuum) = &self.vacuum {
            write_curve(vacuum, &dir.join("vacuum"))?;
        }
        if let Some(dummy) = &self.dummy {
            write_curve(dummy, &dir.join("dummy"))?;
        }
        for which in PartialProfile::ALL {
            write_curve(&self.partials[which.index()], &dir.join(which.label()))?;
        }
        write_curve(&self.intensity, &dir.join("intensity"))?;
        Ok(())
    }

    /// 与引擎输出逐曲线对比
    pub fn compare(
        &self,
        profile: &Profile,
        intensity: &[f64],
        rtol: f64,
        atol: f64,
    ) -> Vec<CurveComparison> {
        let mut results = vec![compare_curve("q", profile.all_q(), &self.q, rtol, atol)];
        let first_atom = |ff: &[Vec<f64>]| ff.first().cloned().unwrap_or_default();
        if let Some(vacuum) = &self.vacuum {
            let actual = first_atom(profile.vacuum_ff());
            results.push(compare_curve("vacuum", &actual, vacuum, rtol, atol));
        }
        if let Some(dummy) = &self.dummy {
            let actual = first_atom(profile.dummy_ff());
            results.push(compare_curve("dummy", &actual, dummy, rtol, atol));
        }
        for which in PartialProfile::ALL {
            results.push(compare_curve(
                which.label(),
                profile.partial(which),
                &self.partials[which.index()],
                rtol,
                atol,
            ));
        }
        results.push(compare_curve("intensity", intensity, &self.intensity, rtol, atol));
        results
    }

    /// 对比并在首个不通过的曲线上返回 `ReferenceMismatch`
    pub fn verify(
        &self,
        profile: &Profile,
        intensity: &[f64],
        rtol: f64,
        atol: f64,
    ) -> Result<Vec<CurveComparison>> {
        let results = self.compare(profile, intensity, rtol, atol);
        if let Some(failed) = results.iter().find(|r| !r.passed) {
            return Err(SaxsError::ReferenceMismatch {
                curve: failed.curve.clone(),
                index: failed.index,
                max_deviation: failed.max_deviation,
            });
        }
        Ok(results)
    }
}

/// 对比单条曲线；长度不同视为在第一个缺失索引处偏差无穷大
pub fn compare_curve(
    name: &str,
    actual: &[f64],
    expected: &[f64],
    rtol: f64,
    atol: f64,
) -> CurveComparison {
    if actual.len() != expected.len() {
        return CurveComparison {
            curve: name.to_string(),
            samples: actual.len().min(expected.len()),
            max_deviation: f64::INFINITY,
            index: actual.len().min(expected.len()),
            passed: false,
        };
    }

    let (index, max_deviation) = actual
        .iter()
        .zip(expected)
        .map(|(a, b)| (a - b).abs())
        .enumerate()
        .fold((0, 0.0_f64), |best, (i, d)| {
            if d > best.1 || d.is_nan() {
                (i, d)
            } else {
                best
            }
        });

    CurveComparison {
        curve: name.to_string(),
        samples: actual.len(),
        max_deviation,
        index,
        passed: all_close(actual, expected, rtol, atol),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_close_tolerances() {
        assert!(all_close(&[1.0, 2.0], &[1.0, 2.0], 0.0, 0.0));
        assert!(all_close(&[1.00001], &[1.0], 1e-4, 0.0));
        assert!(!all_close(&[1.001], &[1.0], 1e-4, 1e-6));
        assert!(all_close(&[1e-9], &[0.0], 0.0, 1e-8));
        assert!(!all_close(&[1.0], &[1.0, 2.0], 1.0, 1.0));
        assert!(!all_close(&[f64::NAN], &[1.0], 1.0, 1.0));
    }

    #[test]
    fn test_compare_curve_reports_worst_index() {
        let c = compare_curve("x", &[1.0, 2.5, 3.0], &[1.0, 2.0, 3.1], 0.0, 0.2);
        assert_eq!(c.index, 1);
        assert!((c.max_deviation - 0.5).abs() < 1e-12);
        assert!(!c.passed);

        let c = compare_curve("x", &[1.0], &[1.0, 2.0], 0.0, 0.0);
        assert!(!c.passed);
        assert!(c.max_deviation.is_infinite());
    }

    #[test]
    fn test_save_load_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::new(0.0, 0.3, 0.1).unwrap();
        let intensity = vec![4.0, 3.0, 2.0, 1.0];

        let set = ReferenceSet::from_profile(&profile, &intensity);
        assert!(set.vacuum.is_none());
        set.save(dir.path()).unwrap();

        let loaded = ReferenceSet::load(dir.path(), VacDumConvention::Engine).unwrap();
        assert_eq!(loaded, set);
        assert!(loaded.dummy.is_none());

        let results = loaded
            .verify(&profile, &intensity, DEFAULT_RTOL, DEFAULT_ATOL)
            .unwrap();
        assert!(results.iter().all(|r| r.passed));

        let shifted: Vec<f64> = intensity.iter().map(|v| v * 1.01).collect();
        let err = loaded
            .verify(&profile, &shifted, DEFAULT_RTOL, DEFAULT_ATOL)
            .unwrap_err();
        assert!(matches!(
            err,
            SaxsError::ReferenceMismatch { ref curve, index: 0, .. } if curve == "intensity"
        ));
    }

    #[test]
    fn test_form_factor_curves_are_compared() {
        let profile = Profile::new(0.0, 0.3, 0.1).unwrap();
        let intensity = vec![0.0; 4];
        let mut set = ReferenceSet::from_profile(&profile, &intensity);
        set.vacuum = Some(vec![6.0, 5.9, 5.7, 5.4]);

        // 没有原子时形状因子曲线为空，长度不符
        let results = set.compare(&profile, &intensity, DEFAULT_RTOL, DEFAULT_ATOL);
        let vacuum = results.iter().find(|r| r.curve == "vacuum").unwrap();
        assert!(!vacuum.passed);
        assert!(results.iter().all(|r| r.curve != "dummy"));
    }

    #[test]
    fn test_imp_convention_halves_vac_dum() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::new(0.0, 0.3, 0.1).unwrap();
        let intensity = vec![0.0; 4];

        let vac_dum = [12.0, 10.0, 7.5, 4.0];
        let mut set = ReferenceSet::from_profile(&profile, &intensity);
        set.partials[PartialProfile::VacDum.index()] = vac_dum.iter().map(|v| 2.0 * v).collect();
        set.save(dir.path()).unwrap();

        let imp = ReferenceSet::load(dir.path(), VacDumConvention::Imp).unwrap();
        assert_eq!(imp.partials[PartialProfile::VacDum.index()], vac_dum);
        assert_eq!(imp.partials[PartialProfile::VacVac.index()], set.partials[0]);

        let engine = ReferenceSet::load(dir.path(), VacDumConvention::Engine).unwrap();
        assert_eq!(
            engine.partials[PartialProfile::VacDum.index()],
            set.partials[PartialProfile::VacDum.index()]
        );
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ReferenceSet::load(&dir.path().join("nope"), VacDumConvention::Engine),
            Err(SaxsError::FileNotFound { .. })
        ));
    }
}
