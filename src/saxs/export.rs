//! # SAXS 数据导出
//!
//! 导出强度曲线、部分曲线与 RDF。
//!
//! ## 支持格式
//! - CSV: q, intensity, vac_vac, dum_dum, vac_dum
//! - DAT: 空白分隔的 q / I(q)，带 `#` 注释头（常见 SAXS 交换格式）
//! - 单列曲线: 每行一个数值，供参考数据对比使用
//!
//! ## 依赖关系
//! - 被 `commands/` 与 `saxs/reference.rs` 调用
//! - 使用 `saxs/profile.rs` 的 Profile 结构
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{Result, SaxsError};
use crate::saxs::profile::{PartialProfile, Profile};
use crate::saxs::rdf::RadialDistributionFunction;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

fn write_error(path: &Path) -> impl Fn(std::io::Error) -> SaxsError + '_ {
    move |e| SaxsError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    }
}

fn check_length(what: &str, profile: &Profile, intensity: &[f64]) -> Result<()> {
    if intensity.len() != profile.len() {
        return Err(SaxsError::shape(what, profile.len(), intensity.len()));
    }
    Ok(())
}

/// 导出强度与部分曲线为 CSV 格式
pub fn to_csv(profile: &Profile, intensity: &[f64], output_path: &Path) -> Result<()> {
    check_length("intensity samples", profile, intensity)?;

    let mut wtr = csv::Writer::from_path(output_path)?;

    let mut header = vec!["q", "intensity"];
    header.extend(PartialProfile::ALL.iter().map(|p| p.label()));
    wtr.write_record(&header)?;

    for (k, q) in profile.all_q().iter().enumerate() {
        let mut record = vec![format!("{:.6}", q), format!("{:.8e}", intensity[k])];
        record.extend(
            PartialProfile::ALL
                .iter()
                .map(|&p| format!("{:.8e}", profile.partial(p)[k])),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(write_error(output_path))?;
    Ok(())
}

/// 导出强度为 DAT 格式
pub fn to_dat(
    profile: &Profile,
    intensity: &[f64],
    structure_name: &str,
    output_path: &Path,
) -> Result<()> {
    check_length("intensity samples", profile, intensity)?;

    let file = File::create(output_path).map_err(write_error(output_path))?;
    let mut out = BufWriter::new(file);
    let err = write_error(output_path);

    writeln!(out, "# SAXS profile: {}", structure_name).map_err(&err)?;
    writeln!(out, "# Atoms: {}", profile.num_atoms()).map_err(&err)?;
    writeln!(out, "# Columns: q (1/Angstrom), I(q)").map_err(&err)?;
    writeln!(out, "#").map_err(&err)?;

    for (q, i) in profile.all_q().iter().zip(intensity) {
        writeln!(out, "{:>12.6} {:>18.8e}", q, i).map_err(&err)?;
    }

    out.flush().map_err(&err)?;
    Ok(())
}

/// 写出单列曲线（每行一个数值）
pub fn write_curve(values: &[f64], output_path: &Path) -> Result<()> {
    let file = File::create(output_path).map_err(write_error(output_path))?;
    let mut out = BufWriter::new(file);
    let err = write_error(output_path);

    for v in values {
        writeln!(out, "{:.17e}", v).map_err(&err)?;
    }
    out.flush().map_err(&err)?;
    Ok(())
}

/// 读取单列曲线；空白分隔，`#` 开头为注释
pub fn read_curve(path: &Path) -> Result<Vec<f64>> {
    if !path.exists() {
        return Err(SaxsError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| SaxsError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut values = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for token in line.split_whitespace() {
            let v = token.parse::<f64>().map_err(|_| SaxsError::ParseError {
                format: "curve".to_string(),
                path: path.display().to_string(),
                reason: format!("line {}: invalid number '{}'", line_no + 1, token),
            })?;
            values.push(v);
        }
    }
    Ok(values)
}

/// 导出 RDF 为 CSV 格式（箱中心距离, 计数）
pub fn rdf_to_csv(rdf: &RadialDistributionFunction, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    wtr.write_record(["r", "count"])?;
    for (i, v) in rdf.values().iter().enumerate() {
        wtr.write_record(&[format!("{:.4}", rdf.bin_center(i)), format!("{}", v)])?;
    }
    wtr.flush().map_err(write_error(output_path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_round_trip_preserves_bits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve");
        let values = vec![0.1, 1.0 / 3.0, -2.5e-12, 12345.678];
        write_curve(&values, &path).unwrap();
        assert_eq!(read_curve(&path).unwrap(), values);
    }

    #[test]
    fn test_read_curve_skips_comments_and_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve");
        fs::write(&path, "# header\n1.0 2.0\n\n3.0\n").unwrap();
        assert_eq!(read_curve(&path).unwrap(), vec![1.0, 2.0, 3.0]);

        fs::write(&path, "1.0\nabc\n").unwrap();
        assert!(matches!(read_curve(&path), Err(SaxsError::ParseError { .. })));

        assert!(matches!(
            read_curve(&dir.path().join("missing")),
            Err(SaxsError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_csv_and_dat_layout() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::new(0.0, 0.2, 0.1).unwrap();
        let intensity = vec![3.0, 2.0, 1.0];

        let csv_path = dir.path().join("p.csv");
        to_csv(&profile, &intensity, &csv_path).unwrap();
        let text = fs::read_to_string(&csv_path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("q,intensity,vac_vac,dum_dum,vac_dum"));
        assert_eq!(lines.count(), 3);

        let dat_path = dir.path().join("p.dat");
        to_dat(&profile, &intensity, "test", &dat_path).unwrap();
        let text = fs::read_to_string(&dat_path).unwrap();
        let data: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_intensity_length_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::new(0.0, 0.2, 0.1).unwrap();
        let err = to_csv(&profile, &[1.0], &dir.path().join("p.csv")).unwrap_err();
        assert!(matches!(err, SaxsError::ShapeMismatch { .. }));
    }
}
