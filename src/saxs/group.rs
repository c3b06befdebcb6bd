//! # 形状因子基团与散射系数
//!
//! 定义形状因子表的行键（基团枚举）以及每个基团的散射系数。
//!
//! ## 公式
//! 真空形状因子: f(s) = Σᵢ aᵢ exp(-bᵢ s²) + c，其中 s = sin(θ)/λ = q/(4π)
//! 虚原子（排除体积）形状因子: g(q) = ρ₀ V exp(-V^(2/3) q² / (4π))
//!
//! ## 数据来源
//! - 元素系数: International Tables for Crystallography, Vol. C, Table 6.1.1.4
//! - 排除体积: Fraser et al. (1978) / CRYSOL 原子体积
//!
//! ## 依赖关系
//! - 被 `saxs/table.rs` 用于构建形状因子表
//! - 被 `models/structure.rs` 用于原子分组

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;
use std::sync::LazyLock;

/// 溶剂（水）电子密度 (e/Å³)
pub const SOLVENT_ELECTRON_DENSITY: f64 = 0.334;

/// 形状因子基团
///
/// 单个元素，或重原子与其键连氢原子组成的粗粒化基团。
/// 枚举的判别值即形状因子表中的稠密索引。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormFactorGroup {
    H,
    C,
    N,
    O,
    Na,
    Mg,
    P,
    S,
    Cl,
    K,
    Ca,
    Fe,
    Zn,
    Se,
    Au,
    CH,
    CH2,
    CH3,
    NH,
    NH2,
    NH3,
    OH,
    OH2,
    SH,
}

impl FormFactorGroup {
    /// 基团总数
    pub const COUNT: usize = 24;

    /// 所有基团，按索引顺序
    pub const ALL: [FormFactorGroup; Self::COUNT] = [
        Self::H,
        Self::C,
        Self::N,
        Self::O,
        Self::Na,
        Self::Mg,
        Self::P,
        Self::S,
        Self::Cl,
        Self::K,
        Self::Ca,
        Self::Fe,
        Self::Zn,
        Self::Se,
        Self::Au,
        Self::CH,
        Self::CH2,
        Self::CH3,
        Self::NH,
        Self::NH2,
        Self::NH3,
        Self::OH,
        Self::OH2,
        Self::SH,
    ];

    /// 稠密索引
    pub fn index(self) -> usize {
        self as usize
    }

    /// 基团符号
    pub fn symbol(self) -> &'static str {
        match self {
            Self::H => "H",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::Na => "Na",
            Self::Mg => "Mg",
            Self::P => "P",
            Self::S => "S",
            Self::Cl => "Cl",
            Self::K => "K",
            Self::Ca => "Ca",
            Self::Fe => "Fe",
            Self::Zn => "Zn",
            Self::Se => "Se",
            Self::Au => "Au",
            Self::CH => "CH",
            Self::CH2 => "CH2",
            Self::CH3 => "CH3",
            Self::NH => "NH",
            Self::NH2 => "NH2",
            Self::NH3 => "NH3",
            Self::OH => "OH",
            Self::OH2 => "OH2",
            Self::SH => "SH",
        }
    }

    /// 从符号解析（大小写不敏感）
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let symbol = symbol.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|g| g.symbol().eq_ignore_ascii_case(symbol))
    }

    /// 基团组成: (重原子元素, 键连氢原子数)
    pub fn composition(self) -> (FormFactorGroup, u8) {
        match self {
            Self::CH => (Self::C, 1),
            Self::CH2 => (Self::C, 2),
            Self::CH3 => (Self::C, 3),
            Self::NH => (Self::N, 1),
            Self::NH2 => (Self::N, 2),
            Self::NH3 => (Self::N, 3),
            Self::OH => (Self::O, 1),
            Self::OH2 => (Self::O, 2),
            Self::SH => (Self::S, 1),
            element => (element, 0),
        }
    }

    /// 是否为单元素（非复合基团）
    pub fn is_element(self) -> bool {
        self.composition().1 == 0
    }

    /// 重原子与 n 个氢组成的基团；不存在时返回 None
    pub fn with_hydrogens(element: FormFactorGroup, hydrogens: u8) -> Option<Self> {
        match (element, hydrogens) {
            (e, 0) => Some(e),
            (Self::C, 1) => Some(Self::CH),
            (Self::C, 2) => Some(Self::CH2),
            (Self::C, 3) => Some(Self::CH3),
            (Self::N, 1) => Some(Self::NH),
            (Self::N, 2) => Some(Self::NH2),
            (Self::N, 3) => Some(Self::NH3),
            (Self::O, 1) => Some(Self::OH),
            (Self::O, 2) => Some(Self::OH2),
            (Self::S, 1) => Some(Self::SH),
            _ => None,
        }
    }

    /// 该元素最多可并入的氢原子数
    pub fn max_hydrogens(self) -> u8 {
        match self {
            Self::C | Self::N => 3,
            Self::O => 2,
            Self::S => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for FormFactorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// 基团散射系数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatteringCoefficients {
    /// Gaussian 振幅 aᵢ
    pub a: Vec<f64>,
    /// Gaussian 指数 bᵢ
    pub b: Vec<f64>,
    /// 常数项 c
    pub c: f64,
    /// 排除体积 V (Å³)
    pub excluded_volume: f64,
}

impl ScatteringCoefficients {
    pub fn new(a: Vec<f64>, b: Vec<f64>, c: f64, excluded_volume: f64) -> Self {
        Self {
            a,
            b,
            c,
            excluded_volume,
        }
    }

    /// 真空形状因子 f(q)，q 单位 Å⁻¹
    pub fn vacuum(&self, q: f64) -> f64 {
        let s = q / (4.0 * PI);
        let s2 = s * s;
        self.a
            .iter()
            .zip(self.b.iter())
            .fold(self.c, |f, (a, b)| f + a * (-b * s2).exp())
    }

    /// 虚原子形状因子 g(q)：被排除溶剂体积的散射
    pub fn dummy(&self, q: f64) -> f64 {
        let v = self.excluded_volume;
        SOLVENT_ELECTRON_DENSITY * v * (-v.powf(2.0 / 3.0) * q * q / (4.0 * PI)).exp()
    }

    /// 与排除体积等体积的球半径 (Å)
    pub fn radius(&self) -> f64 {
        (3.0 * self.excluded_volume / (4.0 * PI)).cbrt()
    }

    /// 合并 n 份氢原子系数（用于复合基团）
    pub fn with_hydrogens(&self, hydrogen: &ScatteringCoefficients, count: u8) -> Self {
        let mut merged = self.clone();
        for _ in 0..count {
            merged.a.extend_from_slice(&hydrogen.a);
            merged.b.extend_from_slice(&hydrogen.b);
            merged.c += hydrogen.c;
            merged.excluded_volume += hydrogen.excluded_volume;
        }
        merged
    }
}

/// 从元素系数派生复合基团；已给出的基团保持不变
pub fn complete_groups(coefficients: &mut BTreeMap<FormFactorGroup, ScatteringCoefficients>) {
    let Some(hydrogen) = coefficients.get(&FormFactorGroup::H).cloned() else {
        return;
    };
    for group in FormFactorGroup::ALL {
        if coefficients.contains_key(&group) {
            continue;
        }
        let (element, count) = group.composition();
        if count == 0 {
            continue;
        }
        if let Some(base) = coefficients.get(&element).cloned() {
            coefficients.insert(group, base.with_hydrogens(&hydrogen, count));
        }
    }
}

fn cromer_mann(a: [f64; 4], b: [f64; 4], c: f64, excluded_volume: f64) -> ScatteringCoefficients {
    ScatteringCoefficients::new(a.to_vec(), b.to_vec(), c, excluded_volume)
}

/// 内置默认系数表（进程级只读常量，首次访问时构建）
pub static DEFAULT_COEFFICIENTS: LazyLock<BTreeMap<FormFactorGroup, ScatteringCoefficients>> =
    LazyLock::new(|| {
        use FormFactorGroup as G;
        let mut m = BTreeMap::new();

        m.insert(
            G::H,
            cromer_mann(
                [0.493002, 0.322912, 0.140191, 0.040810],
                [10.5109, 26.1257, 3.14236, 57.7997],
                0.003038,
                5.15,
            ),
        );
        m.insert(
            G::C,
            cromer_mann(
                [2.3100, 1.0200, 1.5886, 0.8650],
                [20.8439, 10.2075, 0.5687, 51.6512],
                0.2156,
                16.44,
            ),
        );
        m.insert(
            G::N,
            cromer_mann(
                [12.2126, 3.1322, 2.0125, 1.1663],
                [0.0057, 9.8933, 28.9975, 0.5826],
                -11.529,
                2.49,
            ),
        );
        m.insert(
            G::O,
            cromer_mann(
                [3.0485, 2.2868, 1.5463, 0.8670],
                [13.2771, 5.7011, 0.3239, 32.9089],
                0.2508,
                9.13,
            ),
        );
        m.insert(
            G::Na,
            cromer_mann(
                [4.7626, 3.1736, 1.2674, 1.1128],
                [3.2850, 8.8422, 0.3136, 129.424],
                0.6760,
                4.45,
            ),
        );
        m.insert(
            G::Mg,
            cromer_mann(
                [5.4204, 2.1735, 1.2269, 2.3073],
                [2.8275, 79.2611, 0.3808, 7.1937],
                0.8584,
                1.56,
            ),
        );
        m.insert(
            G::P,
            cromer_mann(
                [6.4345, 4.1791, 1.7800, 1.4908],
                [1.9067, 27.1570, 0.5260, 68.1645],
                1.1149,
                5.73,
            ),
        );
        m.insert(
            G::S,
            cromer_mann(
                [6.9053, 5.2034, 1.4379, 1.5863],
                [1.4679, 22.2151, 0.2536, 56.1720],
                0.8669,
                19.86,
            ),
        );
        m.insert(
            G::Cl,
            cromer_mann(
                [11.4604, 7.1964, 6.2556, 1.6455],
                [0.0104, 1.1662, 18.5194, 47.7784],
                -9.5574,
                23.0,
            ),
        );
        m.insert(
            G::K,
            cromer_mann(
                [8.2186, 7.4398, 1.0519, 0.8659],
                [12.7949, 0.7748, 213.187, 41.6841],
                1.4228,
                22.4,
            ),
        );
        m.insert(
            G::Ca,
            cromer_mann(
                [8.6266, 7.3873, 1.5899, 1.0211],
                [10.4421, 0.6599, 85.7484, 178.437],
                1.3751,
                8.8,
            ),
        );
        m.insert(
            G::Fe,
            cromer_mann(
                [11.7695, 7.3573, 3.5222, 2.3045],
                [4.7611, 0.3072, 15.3535, 76.8805],
                1.0369,
                7.99,
            ),
        );
        m.insert(
            G::Zn,
            cromer_mann(
                [14.0743, 7.0318, 5.1652, 2.4100],
                [3.2655, 0.2333, 10.3163, 58.7097],
                1.3041,
                9.85,
            ),
        );
        m.insert(
            G::Se,
            cromer_mann(
                [17.0006, 5.8196, 3.9731, 4.3543],
                [2.4098, 0.2726, 15.2372, 43.8163],
                2.8409,
                28.73,
            ),
        );
        m.insert(
            G::Au,
            cromer_mann(
                [16.8819, 18.5913, 25.5582, 5.8600],
                [0.4611, 8.6216, 1.4826, 36.3956],
                12.0658,
                19.86,
            ),
        );

        complete_groups(&mut m);
        m
    });

/// 获取内置系数
pub fn default_coefficients(group: FormFactorGroup) -> Option<&'static ScatteringCoefficients> {
    DEFAULT_COEFFICIENTS.get(&group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_index_is_dense() {
        for (i, g) in FormFactorGroup::ALL.iter().enumerate() {
            assert_eq!(g.index(), i);
        }
    }

    #[test]
    fn test_from_symbol() {
        assert_eq!(FormFactorGroup::from_symbol("c"), Some(FormFactorGroup::C));
        assert_eq!(FormFactorGroup::from_symbol("FE"), Some(FormFactorGroup::Fe));
        assert_eq!(
            FormFactorGroup::from_symbol("nh3"),
            Some(FormFactorGroup::NH3)
        );
        assert_eq!(FormFactorGroup::from_symbol("Xx"), None);
    }

    #[test]
    fn test_every_group_has_default_coefficients() {
        for g in FormFactorGroup::ALL {
            assert!(default_coefficients(g).is_some(), "missing {}", g);
        }
    }

    #[test]
    fn test_vacuum_zero_close_to_electron_count() {
        let c = default_coefficients(FormFactorGroup::C).unwrap();
        assert!((c.vacuum(0.0) - 6.0).abs() < 0.05);

        let ch2 = default_coefficients(FormFactorGroup::CH2).unwrap();
        assert!((ch2.vacuum(0.0) - 8.0).abs() < 0.05);
    }

    #[test]
    fn test_dummy_zero_is_density_times_volume() {
        let o = default_coefficients(FormFactorGroup::O).unwrap();
        assert!((o.dummy(0.0) - 0.334 * 9.13).abs() < 1e-12);

        let ch = default_coefficients(FormFactorGroup::CH).unwrap();
        assert!((ch.excluded_volume - 21.59).abs() < 1e-9);
    }

    #[test]
    fn test_form_factors_decay_with_q() {
        let s = default_coefficients(FormFactorGroup::S).unwrap();
        assert!(s.vacuum(2.0) < s.vacuum(0.0));
        assert!(s.dummy(2.0) < s.dummy(0.0));
    }

    #[test]
    fn test_with_hydrogens() {
        use FormFactorGroup as G;
        assert_eq!(G::with_hydrogens(G::C, 2), Some(G::CH2));
        assert_eq!(G::with_hydrogens(G::S, 2), None);
        assert_eq!(G::with_hydrogens(G::Fe, 0), Some(G::Fe));
        assert_eq!(G::OH2.composition(), (G::O, 2));
    }
}
