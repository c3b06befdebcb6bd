//! # SAXS 图表生成
//!
//! 使用 `plotters` 库绘制 log₁₀ I(q) 对 q 的曲线。
//!
//! ## 功能
//! - 最终强度与可选的三条部分曲线
//! - 支持 PNG 和 SVG 输出
//!
//! ## 依赖关系
//! - 被 `commands/profile.rs` 调用
//! - 使用 `saxs/profile.rs` 的 Profile 结构
//! - 使用 `plotters` 渲染图表

use crate::error::{Result, SaxsError};
use crate::saxs::profile::{PartialProfile, Profile};

use plotters::prelude::*;
use std::path::Path;

/// 图表参数
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub show_partials: bool,
    pub use_svg: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            title: "SAXS profile".to_string(),
            width: 1200,
            height: 800,
            show_partials: false,
            use_svg: false,
        }
    }
}

/// 生成强度曲线图
pub fn generate_profile_plot(
    profile: &Profile,
    intensity: &[f64],
    output_path: &Path,
    options: &PlotOptions,
) -> Result<()> {
    if intensity.len() != profile.len() {
        return Err(SaxsError::shape(
            "intensity samples",
            profile.len(),
            intensity.len(),
        ));
    }

    let size = (options.width, options.height);
    if options.use_svg {
        let root = SVGBackend::new(output_path, size).into_drawing_area();
        draw_profile_chart(&root, profile, intensity, options)?;
        root.present()
            .map_err(|e| SaxsError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, size).into_drawing_area();
        draw_profile_chart(&root, profile, intensity, options)?;
        root.present()
            .map_err(|e| SaxsError::Other(e.to_string()))?;
    }
    Ok(())
}

/// 取正值的 log₁₀；非正值无法在对数坐标显示，跳过
fn log_points(q: &[f64], values: &[f64]) -> Vec<(f64, f64)> {
    q.iter()
        .zip(values)
        .filter(|(_, v)| **v > 0.0)
        .map(|(q, v)| (*q, v.log10()))
        .collect()
}

fn draw_profile_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    profile: &Profile,
    intensity: &[f64],
    options: &PlotOptions,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| SaxsError::Other(format!("{:?}", e)))?;

    let q = profile.all_q();
    let mut series = vec![("I(q)".to_string(), log_points(q, intensity))];
    if options.show_partials {
        for which in PartialProfile::ALL {
            series.push((which.label().to_string(), log_points(q, profile.partial(which))));
        }
    }

    let (y_min, y_max) = series
        .iter()
        .flat_map(|(_, pts)| pts.iter().map(|p| p.1))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
    if !y_min.is_finite() {
        return Err(SaxsError::InvalidArgument(
            "profile has no positive intensities to plot".to_string(),
        ));
    }
    let pad = ((y_max - y_min) * 0.05).max(0.1);

    let x_min = q.first().copied().unwrap_or(0.0);
    let x_max = q.last().copied().unwrap_or(1.0).max(x_min + 1e-6);

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, (y_min - pad)..(y_max + pad))
        .map_err(|e| SaxsError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("q (1/Å)")
        .y_desc("log₁₀ I(q)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| SaxsError::Other(format!("{:?}", e)))?;

    let palette = [
        RGBColor(0, 102, 204),
        RGBColor(204, 51, 0),
        RGBColor(0, 153, 76),
        RGBColor(153, 0, 153),
    ];

    for (i, (label, points)) in series.into_iter().enumerate() {
        let color = palette[i % palette.len()];
        let width = if i == 0 { 3 } else { 1 };
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(width)))
            .map_err(|e| SaxsError::Other(format!("{:?}", e)))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| SaxsError::Other(format!("{:?}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_points_skip_non_positive() {
        let pts = log_points(&[0.0, 0.1, 0.2], &[100.0, 0.0, -1.0]);
        assert_eq!(pts, vec![(0.0, 2.0)]);
    }

    #[test]
    fn test_empty_intensity_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::new(0.0, 0.1, 0.1).unwrap();
        let options = PlotOptions {
            use_svg: true,
            ..PlotOptions::default()
        };
        let err = generate_profile_plot(&profile, &[0.0, 0.0], &dir.path().join("x.svg"), &options)
            .unwrap_err();
        assert!(matches!(err, SaxsError::InvalidArgument(_)));
    }
}
