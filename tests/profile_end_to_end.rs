//! 从 PDB 文件到强度曲线与参考数据对比的完整流程

use saxskit::models::Grouping;
use saxskit::parsers::parse_structure_file;
use saxskit::saxs::reference::{ReferenceSet, VacDumConvention, DEFAULT_ATOL, DEFAULT_RTOL};
use saxskit::saxs::{
    calculate_profile_partial, compute_profile, export, DebyeMethod, FormFactorGroup,
    FormFactorTable, PartialProfile, Profile, ProfileOptions,
};
use saxskit::SaxsError;

use std::fs;
use std::path::{Path, PathBuf};

/// 单个丙氨酸残基片段（含氢，共 10 个原子）
const ATOMS: [(&str, &str, [f64; 3]); 10] = [
    ("N", "N", [0.000, 0.000, 0.000]),
    ("H", "H", [-0.900, 0.400, 0.000]),
    ("CA", "C", [1.460, 0.000, 0.000]),
    ("HA", "H", [1.800, -1.000, 0.200]),
    ("CB", "C", [2.000, 0.800, 1.200]),
    ("HB1", "H", [3.100, 0.800, 1.200]),
    ("HB2", "H", [1.650, 1.830, 1.200]),
    ("HB3", "H", [1.650, 0.300, 2.100]),
    ("C", "C", [2.000, -0.200, -1.400]),
    ("O", "O", [1.500, -0.500, -2.500]),
];

fn pdb_text() -> String {
    let mut text = String::from("HEADER    ALANINE FRAGMENT\n");
    for (i, (name, element, [x, y, z])) in ATOMS.iter().enumerate() {
        text.push_str(&format!(
            "ATOM  {:>5} {:<4} {:>3} A{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00          {:>2}\n",
            i + 1,
            name,
            "ALA",
            1,
            x,
            y,
            z,
            element
        ));
    }
    text.push_str("END\n");
    text
}

fn write_structure(dir: &Path) -> PathBuf {
    let path = dir.join("ala.pdb");
    fs::write(&path, pdb_text()).unwrap();
    path
}

fn table() -> FormFactorTable {
    FormFactorTable::new(None, 0.0, 3.0, 0.01).unwrap()
}

fn heavy_options() -> ProfileOptions {
    ProfileOptions {
        grouping: Grouping::HeavyAtoms,
        ..ProfileOptions::default()
    }
}

#[test]
fn heavy_atom_grouping_builds_compound_groups() {
    let dir = tempfile::tempdir().unwrap();
    let particle = parse_structure_file(&write_structure(dir.path()), Grouping::HeavyAtoms).unwrap();

    let groups: Vec<FormFactorGroup> = particle.atoms.iter().map(|a| a.group).collect();
    assert_eq!(
        groups,
        vec![
            FormFactorGroup::NH,
            FormFactorGroup::CH,
            FormFactorGroup::CH3,
            FormFactorGroup::C,
            FormFactorGroup::O,
        ]
    );
    assert_eq!(particle.name, "ala");
}

#[test]
fn profile_shapes_and_forward_scattering() {
    let dir = tempfile::tempdir().unwrap();
    let particle = parse_structure_file(&write_structure(dir.path()), Grouping::HeavyAtoms).unwrap();
    let table = table();

    let (profile, intensity) = compute_profile(&particle, &table, None, &heavy_options()).unwrap();

    assert_eq!(profile.all_q().len(), 301);
    assert_eq!(intensity.len(), 301);
    assert_eq!(profile.partial_profiles().len(), 3);
    assert!(profile.partial_profiles().iter().all(|p| p.len() == 301));

    let net: f64 = profile
        .vacuum_ff()
        .iter()
        .zip(profile.dummy_ff())
        .map(|(v, d)| v[0] - d[0])
        .sum();
    assert!((intensity[0] - net * net).abs() <= 1e-9 * net * net);
    assert!(intensity.iter().all(|i| i.is_finite()));
}

#[test]
fn forward_scattering_does_not_depend_on_grouping() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_structure(dir.path());
    let table = table();

    let heavy = parse_structure_file(&path, Grouping::HeavyAtoms).unwrap();
    let all = parse_structure_file(&path, Grouping::AllAtoms).unwrap();
    assert_eq!(all.len(), 10);

    let (_, i_heavy) = compute_profile(&heavy, &table, None, &heavy_options()).unwrap();
    let (_, i_all) = compute_profile(&all, &table, None, &ProfileOptions::default()).unwrap();
    assert!((i_heavy[0] - i_all[0]).abs() <= 1e-9 * i_all[0].abs());
}

#[test]
fn repeated_calculation_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let particle = parse_structure_file(&write_structure(dir.path()), Grouping::HeavyAtoms).unwrap();
    let table = table();

    let mut profile = Profile::new(0.0, 3.0, 0.01).unwrap();
    let first = calculate_profile_partial(
        &mut profile,
        &particle,
        None,
        &table,
        table.vacuum_form_factors(),
        table.dummy_form_factors(),
        1.0,
        0.0,
    )
    .unwrap();
    let partials = profile.partial_profiles().clone();

    let second = calculate_profile_partial(
        &mut profile,
        &particle,
        None,
        &table,
        table.vacuum_form_factors(),
        table.dummy_form_factors(),
        1.0,
        0.0,
    )
    .unwrap();

    assert_eq!(first, second);
    assert_eq!(&partials, profile.partial_profiles());
    assert_eq!(profile.num_atoms(), 5);
}

#[test]
fn binned_method_tracks_exact_sum() {
    let dir = tempfile::tempdir().unwrap();
    let particle = parse_structure_file(&write_structure(dir.path()), Grouping::HeavyAtoms).unwrap();
    let table = FormFactorTable::new(None, 0.0, 0.5, 0.005).unwrap();

    let (exact, _) = compute_profile(&particle, &table, None, &heavy_options()).unwrap();
    let binned_options = ProfileOptions {
        method: DebyeMethod::Binned { bin_size: 0.01 },
        ..heavy_options()
    };
    let (binned, _) = compute_profile(&particle, &table, None, &binned_options).unwrap();

    for which in PartialProfile::ALL {
        let a = exact.partial(which);
        let b = binned.partial(which);
        for k in 0..a.len() {
            assert!((a[k] - b[k]).abs() <= 1e-2 * a[k].abs() + 1e-6, "{} at {}", which, k);
        }
    }
}

#[test]
fn reference_round_trip_and_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let particle = parse_structure_file(&write_structure(dir.path()), Grouping::HeavyAtoms).unwrap();
    let table = table();
    let (profile, intensity) = compute_profile(&particle, &table, None, &heavy_options()).unwrap();

    // 参考集包含第一个原子（NH 基团）的形状因子曲线
    let reference_dir = dir.path().join("reference");
    ReferenceSet::from_profile(&profile, &intensity)
        .save(&reference_dir)
        .unwrap();

    let loaded = ReferenceSet::load(&reference_dir, VacDumConvention::Engine).unwrap();
    let row = table.row(FormFactorGroup::NH).unwrap();
    assert_eq!(loaded.vacuum.as_deref(), Some(&table.vacuum_form_factors()[row][..]));
    assert_eq!(loaded.dummy.as_deref(), Some(&table.dummy_form_factors()[row][..]));

    let results = loaded
        .verify(&profile, &intensity, DEFAULT_RTOL, DEFAULT_ATOL)
        .unwrap();
    assert_eq!(results.len(), 7);
    assert!(results.iter().all(|r| r.passed));

    // c1 改变后强度偏离参考
    let rescaled = profile.sum_partial_profiles(1.05, 0.0).unwrap();
    let err = loaded
        .verify(&profile, &rescaled, DEFAULT_RTOL, DEFAULT_ATOL)
        .unwrap_err();
    assert!(matches!(err, SaxsError::ReferenceMismatch { ref curve, .. } if curve == "intensity"));
}

#[test]
fn imp_reference_with_doubled_vac_dum() {
    let dir = tempfile::tempdir().unwrap();
    let particle = parse_structure_file(&write_structure(dir.path()), Grouping::HeavyAtoms).unwrap();
    let (profile, intensity) = compute_profile(&particle, &table(), None, &heavy_options()).unwrap();

    // IMP / libsaxs 保存的 vac_dum 为两倍
    let reference_dir = dir.path().join("imp");
    let mut set = ReferenceSet::from_profile(&profile, &intensity);
    let vd = PartialProfile::VacDum.index();
    set.partials[vd] = set.partials[vd].iter().map(|v| 2.0 * v).collect();
    set.save(&reference_dir).unwrap();

    let imp = ReferenceSet::load(&reference_dir, VacDumConvention::Imp).unwrap();
    assert!(imp
        .verify(&profile, &intensity, DEFAULT_RTOL, DEFAULT_ATOL)
        .unwrap()
        .iter()
        .all(|r| r.passed));

    let engine = ReferenceSet::load(&reference_dir, VacDumConvention::Engine).unwrap();
    let err = engine
        .verify(&profile, &intensity, DEFAULT_RTOL, DEFAULT_ATOL)
        .unwrap_err();
    assert!(matches!(err, SaxsError::ReferenceMismatch { ref curve, .. } if curve == "vac_dum"));
}

#[test]
fn nh_and_o_pair_matches_hand_computed_partials() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no.xyz");
    // H 并入 N 成为 NH，NH 与 O 相距 3 Å
    fs::write(&path, "3\nNH...O\nN 0.0 0.0 0.0\nH 1.0 0.0 0.0\nO 0.0 3.0 0.0\n").unwrap();
    let particle = parse_structure_file(&path, Grouping::HeavyAtoms).unwrap();
    let groups: Vec<FormFactorGroup> = particle.atoms.iter().map(|a| a.group).collect();
    assert_eq!(groups, vec![FormFactorGroup::NH, FormFactorGroup::O]);

    let (profile, intensity) = compute_profile(&particle, &table(), None, &heavy_options()).unwrap();

    // 由 Cromer-Mann 系数与 ρ0·V·exp(-V^(2/3)·q²/4π) 手算，r = 3 Å
    // (q 索引, vv, dd, vd, I)
    let expected = [
        (0, 255.80653256620894, 31.373217392400008, 89.58500966454, 108.00973062952896),
        (50, 205.1909263694289, 22.178688674450065, 67.41522839240335, 92.53915825907225),
    ];
    let close = |a: f64, b: f64| (a - b).abs() <= 1e-9 * b.abs();
    for (k, vv, dd, vd, i) in expected {
        assert!((profile.all_q()[k] - 0.01 * k as f64).abs() < 1e-12);
        assert!(close(profile.partial(PartialProfile::VacVac)[k], vv), "vv at {}", k);
        assert!(close(profile.partial(PartialProfile::DumDum)[k], dd), "dd at {}", k);
        assert!(close(profile.partial(PartialProfile::VacDum)[k], vd), "vd at {}", k);
        assert!(close(intensity[k], i), "I at {}", k);
    }
}

#[test]
fn exported_files_cover_the_grid() {
    let dir = tempfile::tempdir().unwrap();
    let particle = parse_structure_file(&write_structure(dir.path()), Grouping::HeavyAtoms).unwrap();
    let (profile, intensity) = compute_profile(&particle, &table(), None, &heavy_options()).unwrap();

    let csv_path = dir.path().join("ala.csv");
    export::to_csv(&profile, &intensity, &csv_path).unwrap();
    assert_eq!(fs::read_to_string(&csv_path).unwrap().lines().count(), 302);

    let dat_path = dir.path().join("ala.dat");
    export::to_dat(&profile, &intensity, &particle.name, &dat_path).unwrap();
    let data_lines = fs::read_to_string(&dat_path)
        .unwrap()
        .lines()
        .filter(|l| !l.starts_with('#'))
        .count();
    assert_eq!(data_lines, 301);
}
