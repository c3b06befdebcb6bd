//! # 分子结构数据模型
//!
//! 定义 SAXS 计算使用的原子与粒子（原子集合）表示。
//! 粒子只向计算引擎提供原子数、坐标、形状因子基团与排除体积半径。
//!
//! ## 分组模式
//! - `AllAtoms`: 每个原子按元素成为一个基团，保留氢原子
//! - `HeavyAtoms`: 氢原子并入 1.3 Å 内最近的重原子（CH2、NH3 ...）后删除
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `saxs/profile.rs` 使用
//! - 使用 `saxs/group.rs` 解析元素到基团

use crate::error::{Result, SaxsError};
use crate::saxs::group::{self, FormFactorGroup};
use crate::saxs::rdf::distance;

use serde::{Deserialize, Serialize};

/// 氢原子并入重原子的最大键长 (Å)
pub const HYDROGEN_BOND_CUTOFF: f64 = 1.3;

/// 结构文件中的原始原子记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomRecord {
    /// 原子名（如 CA, OG1）
    pub name: String,
    /// 残基名
    pub residue: String,
    /// 元素符号
    pub element: String,
    /// 笛卡尔坐标 (Å)
    pub position: [f64; 3],
}

impl AtomRecord {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        let element = element.into();
        AtomRecord {
            name: element.clone(),
            residue: String::new(),
            element,
            position,
        }
    }
}

/// 原子分组模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Grouping {
    /// 每个原子独立
    #[default]
    AllAtoms,
    /// 重原子 + 键连氢
    HeavyAtoms,
}

impl std::fmt::Display for Grouping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grouping::AllAtoms => write!(f, "all-atoms"),
            Grouping::HeavyAtoms => write!(f, "heavy-atoms"),
        }
    }
}

/// 参与散射计算的原子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 笛卡尔坐标 (Å)
    pub position: [f64; 3],
    /// 形状因子基团
    pub group: FormFactorGroup,
    /// 排除体积半径 (Å)
    pub radius: f64,
}

impl Atom {
    /// 以基团的默认排除体积推导半径
    pub fn new(group: FormFactorGroup, position: [f64; 3]) -> Self {
        let radius = group::default_coefficients(group)
            .map(|c| c.radius())
            .unwrap_or(0.0);
        Atom {
            position,
            group,
            radius,
        }
    }
}

/// 粒子：有序原子集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// 结构名称
    pub name: String,
    /// 原子列表
    pub atoms: Vec<Atom>,
    /// 使用的分组模式
    pub grouping: Grouping,
}

impl Particle {
    pub fn new(name: impl Into<String>, atoms: Vec<Atom>) -> Self {
        Particle {
            name: name.into(),
            atoms,
            grouping: Grouping::AllAtoms,
        }
    }

    /// 从原始原子记录构建，按分组模式解析基团
    pub fn from_records(
        name: impl Into<String>,
        records: &[AtomRecord],
        grouping: Grouping,
    ) -> Result<Self> {
        let mut groups = Vec::with_capacity(records.len());
        for record in records {
            let group = FormFactorGroup::from_symbol(&record.element)
                .filter(|g| g.is_element())
                .ok_or_else(|| {
                    SaxsError::Configuration(format!(
                        "no form factor group for element '{}' (atom {} {})",
                        record.element, record.residue, record.name
                    ))
                })?;
            groups.push(group);
        }

        let atoms = match grouping {
            Grouping::AllAtoms => records
                .iter()
                .zip(groups)
                .map(|(r, g)| Atom::new(g, r.position))
                .collect(),
            Grouping::HeavyAtoms => group_heavy_atoms(records, &groups),
        };

        let particle = Particle {
            name: name.into(),
            atoms,
            grouping,
        };
        particle.validate()?;
        Ok(particle)
    }

    /// 原子数
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// 坐标列表
    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.atoms.iter().map(|a| a.position).collect()
    }

    /// 检查坐标与半径是否有效
    pub fn validate(&self) -> Result<()> {
        for (i, atom) in self.atoms.iter().enumerate() {
            if atom.position.iter().any(|c| !c.is_finite()) {
                return Err(SaxsError::InvalidGeometry(format!(
                    "atom {} of '{}' has non-finite coordinates {:?}",
                    i, self.name, atom.position
                )));
            }
            if !(atom.radius.is_finite() && atom.radius >= 0.0) {
                return Err(SaxsError::InvalidGeometry(format!(
                    "atom {} of '{}' has invalid radius {}",
                    i, self.name, atom.radius
                )));
            }
        }
        Ok(())
    }

    /// 几何中心
    pub fn centroid(&self) -> [f64; 3] {
        let n = self.atoms.len().max(1) as f64;
        let mut c = [0.0; 3];
        for atom in &self.atoms {
            for k in 0..3 {
                c[k] += atom.position[k];
            }
        }
        [c[0] / n, c[1] / n, c[2] / n]
    }

    /// 几何回转半径 Rg (Å)
    pub fn radius_of_gyration(&self) -> f64 {
        if self.atoms.is_empty() {
            return 0.0;
        }
        let c = self.centroid();
        let sum: f64 = self
            .atoms
            .iter()
            .map(|a| {
                let d = distance(&a.position, &c);
                d * d
            })
            .sum();
        (sum / self.atoms.len() as f64).sqrt()
    }

    /// 包围盒对角线长度，是任意原子对距离的上界
    pub fn max_extent(&self) -> f64 {
        if self.atoms.is_empty() {
            return 0.0;
        }
        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        for atom in &self.atoms {
            for k in 0..3 {
                lo[k] = lo[k].min(atom.position[k]);
                hi[k] = hi[k].max(atom.position[k]);
            }
        }
        distance(&lo, &hi)
    }

    /// 每种基团的原子数（按基团索引排序）
    pub fn composition(&self) -> Vec<(FormFactorGroup, usize)> {
        let mut counts = [0usize; FormFactorGroup::COUNT];
        for atom in &self.atoms {
            counts[atom.group.index()] += 1;
        }
        FormFactorGroup::ALL
            .iter()
            .filter(|g| counts[g.index()] > 0)
            .map(|&g| (g, counts[g.index()]))
            .collect()
    }
}

/// 将氢原子并入最近的重原子
fn group_heavy_atoms(records: &[AtomRecord], groups: &[FormFactorGroup]) -> Vec<Atom> {
    let heavy: Vec<usize> = (0..records.len())
        .filter(|&i| groups[i] != FormFactorGroup::H)
        .collect();

    let mut attached = vec![0u8; records.len()];
    let mut absorbed = vec![false; records.len()];

    for h in (0..records.len()).filter(|&i| groups[i] == FormFactorGroup::H) {
        let nearest = heavy
            .iter()
            .map(|&i| (i, distance(&records[h].position, &records[i].position)))
            .filter(|&(_, d)| d <= HYDROGEN_BOND_CUTOFF)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((i, _)) = nearest {
            if attached[i] < groups[i].max_hydrogens() {
                attached[i] += 1;
                absorbed[h] = true;
            }
        }
    }

    records
        .iter()
        .enumerate()
        .filter(|&(i, _)| !absorbed[i])
        .map(|(i, r)| {
            let group = FormFactorGroup::with_hydrogens(groups[i], attached[i]).unwrap_or(groups[i]);
            Atom::new(group, r.position)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn methanol() -> Vec<AtomRecord> {
        vec![
            AtomRecord::new("C", [0.0, 0.0, 0.0]),
            AtomRecord::new("O", [1.43, 0.0, 0.0]),
            AtomRecord::new("H", [-0.36, 1.03, 0.0]),
            AtomRecord::new("H", [-0.36, -0.51, 0.89]),
            AtomRecord::new("H", [-0.36, -0.51, -0.89]),
            AtomRecord::new("H", [1.75, 0.0, 0.91]),
        ]
    }

    #[test]
    fn test_all_atoms_keeps_hydrogens() {
        let p = Particle::from_records("MeOH", &methanol(), Grouping::AllAtoms).unwrap();
        assert_eq!(p.len(), 6);
        assert_eq!(p.atoms[0].group, FormFactorGroup::C);
        assert_eq!(p.atoms[5].group, FormFactorGroup::H);
    }

    #[test]
    fn test_heavy_atom_grouping() {
        let p = Particle::from_records("MeOH", &methanol(), Grouping::HeavyAtoms).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.atoms[0].group, FormFactorGroup::CH3);
        assert_eq!(p.atoms[1].group, FormFactorGroup::OH);
        assert_eq!(p.grouping, Grouping::HeavyAtoms);
    }

    #[test]
    fn test_distant_hydrogen_is_kept() {
        let records = vec![
            AtomRecord::new("C", [0.0, 0.0, 0.0]),
            AtomRecord::new("H", [5.0, 0.0, 0.0]),
        ];
        let p = Particle::from_records("x", &records, Grouping::HeavyAtoms).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.atoms[0].group, FormFactorGroup::C);
        assert_eq!(p.atoms[1].group, FormFactorGroup::H);
    }

    #[test]
    fn test_unknown_element_is_rejected() {
        let records = vec![AtomRecord::new("Xx", [0.0, 0.0, 0.0])];
        assert!(matches!(
            Particle::from_records("x", &records, Grouping::AllAtoms),
            Err(SaxsError::Configuration(_))
        ));
    }

    #[test]
    fn test_nan_coordinates_are_rejected() {
        let records = vec![AtomRecord::new("C", [0.0, f64::NAN, 0.0])];
        assert!(matches!(
            Particle::from_records("x", &records, Grouping::AllAtoms),
            Err(SaxsError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_radius_of_gyration() {
        let atoms = vec![
            Atom::new(FormFactorGroup::C, [-1.0, 0.0, 0.0]),
            Atom::new(FormFactorGroup::C, [1.0, 0.0, 0.0]),
        ];
        let p = Particle::new("pair", atoms);
        assert!((p.radius_of_gyration() - 1.0).abs() < 1e-12);
        assert!((p.max_extent() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_atom_radius_from_volume() {
        let atom = Atom::new(FormFactorGroup::C, [0.0; 3]);
        let expected = (3.0 * 16.44 / (4.0 * std::f64::consts::PI)).cbrt();
        assert!((atom.radius - expected).abs() < 1e-12);
    }
}
