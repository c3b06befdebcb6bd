//! # SAXS 强度曲线
//!
//! 由原子坐标与形状因子计算三条部分强度曲线（真空-真空、虚原子-虚原子、
//! 真空-虚原子），再组合成经排除体积校正的强度 I(q)。
//!
//! ## 算法概述 (Debye 公式)
//! 1. 对每个无序原子对 (i, j) 计算距离 r_ij
//! 2. 对每个 qₖ 计算核函数 sin(qₖ r)/(qₖ r)（qₖ r → 0 时为 1）
//! 3. 按原子对的形状因子加权累加三条部分曲线（交叉对计两次，自身对计一次）
//! 4. I(q) = vv(q) - 2·c1·vd(q) + c1²·dd(q)
//!
//! ## 求和方式
//! - `Exact`: 直接对所有原子对求和，O(N²·Q)
//! - `Binned`: 按基团对建立 RDF，核函数只在箱中心求值，O(N² + T²·bins·Q)
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `saxs/table.rs` 的形状因子表
//! - 使用 `saxs/rdf.rs` 的径向分布函数
//! - 使用 `models/structure.rs` 的 Particle
//! - 使用 `rayon` 并行遍历原子对

use crate::error::{Result, SaxsError};
use crate::models::{Grouping, Particle};
use crate::saxs::qgrid::QGrid;
use crate::saxs::rdf::{distance, RadialDistributionFunction};
use crate::saxs::table::FormFactorTable;

use log::{debug, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// 不含水化层时的部分曲线数
pub const BASE_PARTIALS: usize = 3;

/// 提供溶剂可及面积时预留的部分曲线数（含水化层三项）
pub const HYDRATED_PARTIALS: usize = 6;

/// 部分强度曲线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartialProfile {
    VacVac,
    DumDum,
    VacDum,
}

impl PartialProfile {
    pub const COUNT: usize = 3;

    pub const ALL: [PartialProfile; Self::COUNT] = [Self::VacVac, Self::DumDum, Self::VacDum];

    pub fn index(self) -> usize {
        self as usize
    }

    /// 文件名/列名使用的标签
    pub fn label(self) -> &'static str {
        match self {
            Self::VacVac => "vac_vac",
            Self::DumDum => "dum_dum",
            Self::VacDum => "vac_dum",
        }
    }

    /// 在最终强度中的组合系数
    pub fn coefficient(self, c1: f64) -> f64 {
        match self {
            Self::VacVac => 1.0,
            Self::DumDum => c1 * c1,
            Self::VacDum => -2.0 * c1,
        }
    }
}

impl std::fmt::Display for PartialProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Debye 求和方式
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DebyeMethod {
    /// 逐原子对直接求和
    #[default]
    Exact,
    /// 按距离分箱求和
    Binned { bin_size: f64 },
}

/// 强度计算参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileOptions {
    /// 结构读入时的原子分组
    pub grouping: Grouping,
    pub method: DebyeMethod,
    /// 排除体积缩放因子
    pub c1: f64,
    /// 水化层缩放因子（保留，当前无效果）
    pub c2: f64,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            grouping: Grouping::AllAtoms,
            method: DebyeMethod::Exact,
            c1: 1.0,
            c2: 0.0,
        }
    }
}

impl ProfileOptions {
    pub fn validate(&self) -> Result<()> {
        validate_scale(self.c1, self.c2)?;
        if let DebyeMethod::Binned { bin_size } = self.method {
            if !(bin_size.is_finite() && bin_size > 0.0) {
                return Err(SaxsError::Configuration(format!(
                    "bin size must be > 0, got {}",
                    bin_size
                )));
            }
        }
        Ok(())
    }
}

fn validate_scale(c1: f64, c2: f64) -> Result<()> {
    if !(c1.is_finite() && c1 > 0.0) {
        return Err(SaxsError::Configuration(format!(
            "c1 must be a positive number, got {}",
            c1
        )));
    }
    if !c2.is_finite() {
        return Err(SaxsError::Configuration(format!(
            "c2 must be finite, got {}",
            c2
        )));
    }
    Ok(())
}

/// Debye 核函数 sin(x)/x，x → 0 时取 1
pub fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-8 {
        1.0
    } else {
        x.sin() / x
    }
}

/// 形状因子分配结果
#[derive(Debug, Clone, PartialEq)]
pub struct FormFactorAssignment {
    /// 每个原子的水化层权重（溶剂可及面积 × 水分子形状因子），未提供面积时为空
    pub water_ff: Vec<f64>,
    /// 使用的部分曲线数
    pub r_size: usize,
}

/// SAXS 强度曲线
#[derive(Debug, Clone)]
pub struct Profile {
    q_grid: QGrid,
    atom_rows: Vec<usize>,
    vacuum_ff: Vec<Vec<f64>>,
    dummy_ff: Vec<Vec<f64>>,
    water_ff: Vec<f64>,
    partials: [Vec<f64>; PartialProfile::COUNT],
}

impl Profile {
    /// 在 q 网格 (min_q, max_q, delta_q) 上创建空曲线
    pub fn new(min_q: f64, max_q: f64, delta_q: f64) -> Result<Self> {
        Ok(Self::from_grid(QGrid::new(min_q, max_q, delta_q)?))
    }

    pub fn from_grid(q_grid: QGrid) -> Self {
        let n = q_grid.len();
        Self {
            q_grid,
            atom_rows: Vec::new(),
            vacuum_ff: Vec::new(),
            dummy_ff: Vec::new(),
            water_ff: Vec::new(),
            partials: [vec![0.0; n], vec![0.0; n], vec![0.0; n]],
        }
    }

    /// 全部 q 值
    pub fn all_q(&self) -> &[f64] {
        self.q_grid.values()
    }

    pub fn q_grid(&self) -> &QGrid {
        &self.q_grid
    }

    pub fn len(&self) -> usize {
        self.q_grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q_grid.is_empty()
    }

    /// 已分配形状因子的原子数
    pub fn num_atoms(&self) -> usize {
        self.atom_rows.len()
    }

    /// 每个原子对应的形状因子表行号
    pub fn atom_rows(&self) -> &[usize] {
        &self.atom_rows
    }

    /// 每个原子的真空形状因子 [原子][q 索引]
    pub fn vacuum_ff(&self) -> &[Vec<f64>] {
        &self.vacuum_ff
    }

    /// 每个原子的虚原子形状因子 [原子][q 索引]
    pub fn dummy_ff(&self) -> &[Vec<f64>] {
        &self.dummy_ff
    }

    pub fn water_ff(&self) -> &[f64] {
        &self.water_ff
    }

    /// 单条部分曲线
    pub fn partial(&self, which: PartialProfile) -> &[f64] {
        &self.partials[which.index()]
    }

    /// 三条部分曲线，形状 [3][len(q)]，顺序同 `PartialProfile::ALL`
    pub fn partial_profiles(&self) -> &[Vec<f64>; PartialProfile::COUNT] {
        &self.partials
    }

    /// 用缩放参数组合部分曲线为最终强度；不修改曲线本身
    ///
    /// c2 对应的水化层部分曲线不由本引擎填充，因此 c2 不影响结果。
    pub fn sum_partial_profiles(&self, c1: f64, c2: f64) -> Result<Vec<f64>> {
        validate_scale(c1, c2)?;
        if c2 != 0.0 {
            debug!("c2 = {} ignored: hydration layer partials are not populated", c2);
        }

        let mut intensity = vec![0.0; self.len()];
        for which in PartialProfile::ALL {
            let coefficient = which.coefficient(c1);
            for (i, p) in intensity.iter_mut().zip(self.partial(which)) {
                *i += coefficient * p;
            }
        }
        Ok(intensity)
    }
}

/// 检查形状因子矩阵与表、q 网格的一致性
fn check_form_factor_shapes(
    profile: &Profile,
    table: &FormFactorTable,
    vacuum_ff: &[Vec<f64>],
    dummy_ff: &[Vec<f64>],
) -> Result<()> {
    if vacuum_ff.len() != table.num_rows() {
        return Err(SaxsError::shape(
            "vacuum form factor rows",
            table.num_rows(),
            vacuum_ff.len(),
        ));
    }
    if dummy_ff.len() != table.num_rows() {
        return Err(SaxsError::shape(
            "dummy form factor rows",
            table.num_rows(),
            dummy_ff.len(),
        ));
    }
    for row in vacuum_ff.iter().chain(dummy_ff.iter()) {
        if row.len() != profile.len() {
            return Err(SaxsError::shape(
                "form factor q samples",
                profile.len(),
                row.len(),
            ));
        }
    }
    Ok(())
}

/// 为粒子的每个原子写入形状因子向量，后续步骤不再查表
///
/// 溶剂可及面积长度与原子数不一致时视为未提供（不计算水化层权重）。
#[allow(clippy::too_many_arguments)]
pub fn assign_form_factors(
    particle: &Particle,
    profile: &mut Profile,
    surface: Option<&[f64]>,
    vacuum_ff: &[Vec<f64>],
    dummy_ff: &[Vec<f64>],
    table: &FormFactorTable,
    num_atoms: usize,
    r_size: usize,
) -> Result<FormFactorAssignment> {
    if num_atoms != particle.len() {
        return Err(SaxsError::shape("atom count", particle.len(), num_atoms));
    }
    if r_size < BASE_PARTIALS {
        return Err(SaxsError::InvalidArgument(format!(
            "at least {} partial profiles are required, got {}",
            BASE_PARTIALS, r_size
        )));
    }
    particle.validate()?;
    check_form_factor_shapes(profile, table, vacuum_ff, dummy_ff)?;

    let atom_rows = particle
        .atoms
        .iter()
        .map(|atom| table.row(atom.group))
        .collect::<Result<Vec<_>>>()?;

    let surface = match surface {
        Some(s) if s.len() == num_atoms => Some(s),
        Some(s) => {
            warn!(
                "ignoring {} solvent accessible areas for {} atoms",
                s.len(),
                num_atoms
            );
            None
        }
        None => None,
    };

    let (water_ff, r_size) = match surface {
        Some(areas) => {
            if let Some(bad) = areas.iter().find(|a| !(a.is_finite() && **a >= 0.0)) {
                return Err(SaxsError::InvalidGeometry(format!(
                    "invalid solvent accessible area {}",
                    bad
                )));
            }
            let water = table.water_form_factor()?;
            let weights = areas.iter().map(|a| a * water).collect();
            (weights, r_size.max(HYDRATED_PARTIALS))
        }
        None => (Vec::new(), BASE_PARTIALS),
    };

    profile.vacuum_ff = atom_rows.iter().map(|&r| vacuum_ff[r].clone()).collect();
    profile.dummy_ff = atom_rows.iter().map(|&r| dummy_ff[r].clone()).collect();
    profile.water_ff = water_ff.clone();
    profile.atom_rows = atom_rows;

    trace!(
        "assigned form factors to {} atoms ({} partials)",
        num_atoms,
        r_size
    );

    Ok(FormFactorAssignment { water_ff, r_size })
}

/// 计算部分曲线并返回 c1/c2 组合后的强度（逐原子对直接求和）
#[allow(clippy::too_many_arguments)]
pub fn calculate_profile_partial(
    profile: &mut Profile,
    particle: &Particle,
    surface: Option<&[f64]>,
    table: &FormFactorTable,
    vacuum_ff: &[Vec<f64>],
    dummy_ff: &[Vec<f64>],
    c1: f64,
    c2: f64,
) -> Result<Vec<f64>> {
    let options = ProfileOptions {
        c1,
        c2,
        ..ProfileOptions::default()
    };
    calculate_profile_partial_with(profile, particle, surface, table, vacuum_ff, dummy_ff, &options)
}

/// 按给定参数计算部分曲线并返回强度
pub fn calculate_profile_partial_with(
    profile: &mut Profile,
    particle: &Particle,
    surface: Option<&[f64]>,
    table: &FormFactorTable,
    vacuum_ff: &[Vec<f64>],
    dummy_ff: &[Vec<f64>],
    options: &ProfileOptions,
) -> Result<Vec<f64>> {
    options.validate()?;
    particle.validate()?;

    // 直方图在修改 profile 之前构建，失败时 profile 保持原状
    let template = match options.method {
        DebyeMethod::Exact => None,
        DebyeMethod::Binned { bin_size } => Some(RadialDistributionFunction::new(
            bin_size,
            particle.max_extent() + bin_size,
        )?),
    };

    assign_form_factors(
        particle,
        profile,
        surface,
        vacuum_ff,
        dummy_ff,
        table,
        particle.len(),
        BASE_PARTIALS,
    )?;

    let positions = particle.positions();
    profile.partials = match &template {
        None => exact_partials(profile, &positions),
        Some(template) => binned_partials(profile, &positions, vacuum_ff, dummy_ff, template),
    };

    debug!(
        "profile of '{}': {} atoms, {} q points, {:?}",
        particle.name,
        particle.len(),
        profile.len(),
        options.method
    );

    profile.sum_partial_profiles(options.c1, options.c2)
}

/// 用形状因子表构建曲线并计算强度
pub fn compute_profile(
    particle: &Particle,
    table: &FormFactorTable,
    surface: Option<&[f64]>,
    options: &ProfileOptions,
) -> Result<(Profile, Vec<f64>)> {
    let mut profile = Profile::from_grid(table.q_grid().clone());
    let intensity = calculate_profile_partial_with(
        &mut profile,
        particle,
        surface,
        table,
        table.vacuum_form_factors(),
        table.dummy_form_factors(),
        options,
    )?;
    Ok((profile, intensity))
}

type Partials = [Vec<f64>; PartialProfile::COUNT];

fn zero_partials(nq: usize) -> Partials {
    [vec![0.0; nq], vec![0.0; nq], vec![0.0; nq]]
}

fn add_partials(mut a: Partials, b: Partials) -> Partials {
    for (x, y) in a.iter_mut().zip(b.iter()) {
        for (u, v) in x.iter_mut().zip(y.iter()) {
            *u += v;
        }
    }
    a
}

/// 自身项：Σᵢ vᵢ², Σᵢ dᵢ², Σᵢ vᵢdᵢ（核函数恒为 1）
fn add_self_terms(acc: &mut Partials, v: &[f64], d: &[f64], weight: f64) {
    let [vv, dd, vd] = acc;
    for k in 0..v.len() {
        vv[k] += weight * v[k] * v[k];
        dd[k] += weight * d[k] * d[k];
        vd[k] += weight * v[k] * d[k];
    }
}

/// 逐原子对直接求和；按行并行，每个工作线程独立累加后相加
fn exact_partials(profile: &Profile, positions: &[[f64; 3]]) -> Partials {
    let q = profile.all_q();
    let nq = q.len();
    let n = positions.len();
    let vacuum = &profile.vacuum_ff;
    let dummy = &profile.dummy_ff;

    (0..n)
        .into_par_iter()
        .fold(
            || zero_partials(nq),
            |mut acc, i| {
                let (vi, di) = (&vacuum[i], &dummy[i]);
                add_self_terms(&mut acc, vi, di, 1.0);

                let [vv, dd, vd] = &mut acc;
                for j in (i + 1)..n {
                    let r = distance(&positions[i], &positions[j]);
                    let (vj, dj) = (&vacuum[j], &dummy[j]);
                    for k in 0..nq {
                        let s = sinc(q[k] * r);
                        vv[k] += 2.0 * vi[k] * vj[k] * s;
                        dd[k] += 2.0 * di[k] * dj[k] * s;
                        vd[k] += (vi[k] * dj[k] + vj[k] * di[k]) * s;
                    }
                }
                acc
            },
        )
        .reduce(|| zero_partials(nq), add_partials)
}

/// 分箱求和：对每个基团对累积距离直方图，再在箱中心求核函数
/// `template` 的截断距离大于任意原子对距离，保证没有样本被丢弃
fn binned_partials(
    profile: &Profile,
    positions: &[[f64; 3]],
    vacuum_ff: &[Vec<f64>],
    dummy_ff: &[Vec<f64>],
    template: &RadialDistributionFunction,
) -> Partials {
    let q = profile.all_q();
    let nq = q.len();
    let n = positions.len();

    // 表行号 -> 稠密类型号
    let mut slot_of_row = vec![None; vacuum_ff.len()];
    let mut types: Vec<usize> = Vec::new();
    let atom_types: Vec<usize> = profile
        .atom_rows
        .iter()
        .map(|&row| {
            *slot_of_row[row].get_or_insert_with(|| {
                types.push(row);
                types.len() - 1
            })
        })
        .collect();
    let t = types.len();

    let mut partials = zero_partials(nq);
    if n == 0 {
        return partials;
    }

    // 自身项按类型计数
    let mut counts = vec![0usize; t];
    for &a in &atom_types {
        counts[a] += 1;
    }
    for (a, &row) in types.iter().enumerate() {
        add_self_terms(
            &mut partials,
            &vacuum_ff[row],
            &dummy_ff[row],
            counts[a] as f64,
        );
    }

    let histograms = (0..n)
        .into_par_iter()
        .fold(
            || vec![template.clone(); t * t],
            |mut acc, i| {
                for j in (i + 1)..n {
                    let (a, b) = ordered(atom_types[i], atom_types[j]);
                    acc[a * t + b].add_distance(distance(&positions[i], &positions[j]));
                }
                acc
            },
        )
        .reduce(
            || vec![template.clone(); t * t],
            |mut x, y| {
                for (h, g) in x.iter_mut().zip(y.iter()) {
                    h.absorb(g);
                }
                x
            },
        );

    let [vv, dd, vd] = &mut partials;
    for a in 0..t {
        for b in a..t {
            let bins = histograms[a * t + b].occupied_bins();
            if bins.is_empty() {
                continue;
            }
            let (va, da) = (&vacuum_ff[types[a]], &dummy_ff[types[a]]);
            let (vb, db) = (&vacuum_ff[types[b]], &dummy_ff[types[b]]);
            for k in 0..nq {
                let kernel: f64 = bins.iter().map(|&(r, c)| c * sinc(q[k] * r)).sum();
                vv[k] += 2.0 * va[k] * vb[k] * kernel;
                dd[k] += 2.0 * da[k] * db[k] * kernel;
                vd[k] += (va[k] * db[k] + vb[k] * da[k]) * kernel;
            }
        }
    }

    trace!(
        "binned Debye sum: {} group types, {} bins",
        t,
        template.nbins()
    );

    partials
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
