//! # profile 子命令实现
//!
//! 从结构文件计算 SAXS 强度曲线。
//!
//! ## 功能
//! - 支持单文件和批量目录处理
//! - 并行计算（rayon）
//! - 导出数据文件 (CSV/DAT)
//! - 输出图像 (PNG/SVG)
//!
//! ## 依赖关系
//! - 使用 `cli/profile.rs` 定义的 ProfileArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `saxs/` 模块进行计算
//! - 使用 `parsers/` 读取结构

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::profile::{ProfileArgs, ProfileOutputFormat};
use crate::error::{Result, SaxsError};
use crate::models::Particle;
use crate::parsers;
use crate::saxs::plot::{self, PlotOptions};
use crate::saxs::{compute_profile, export, FormFactorTable, Profile, ProfileOptions};
use crate::utils::{output, progress};

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// 执行 profile 子命令
pub fn execute(args: ProfileArgs) -> Result<()> {
    output::print_header("SAXS Profile Calculation");

    if args.input.is_file() {
        execute_single_file(&args)
    } else if args.input.is_dir() {
        execute_batch(&args)
    } else {
        Err(SaxsError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 单文件与批量模式共用的设置
struct ProfileJob {
    table: FormFactorTable,
    options: ProfileOptions,
    format: ProfileOutputFormat,
    plot: PlotOptions,
}

impl ProfileJob {
    fn from_args(args: &ProfileArgs, format: ProfileOutputFormat) -> Result<Self> {
        let options = args.engine.options()?;
        let table = args.engine.table()?;
        Ok(Self {
            table,
            options,
            format,
            plot: PlotOptions {
                title: args.title.clone().unwrap_or_default(),
                width: args.width,
                height: args.height,
                show_partials: args.show_partials,
                use_svg: format == ProfileOutputFormat::Svg,
            },
        })
    }

    /// 读取结构、计算并写出；返回粒子、曲线与强度
    fn run(&self, input: &Path, output_path: &Path) -> Result<(Particle, Profile, Vec<f64>)> {
        let particle = parsers::parse_structure_file(input, self.options.grouping)?;
        let (profile, intensity) = compute_profile(&particle, &self.table, None, &self.options)?;
        self.write(&particle, &profile, &intensity, output_path)?;
        Ok((particle, profile, intensity))
    }

    fn write(
        &self,
        particle: &Particle,
        profile: &Profile,
        intensity: &[f64],
        output_path: &Path,
    ) -> Result<()> {
        match self.format {
            ProfileOutputFormat::Csv => export::to_csv(profile, intensity, output_path),
            ProfileOutputFormat::Dat => {
                export::to_dat(profile, intensity, &particle.name, output_path)
            }
            ProfileOutputFormat::Png | ProfileOutputFormat::Svg => {
                let mut plot = self.plot.clone();
                if plot.title.is_empty() {
                    plot.title = particle.name.clone();
                }
                plot::generate_profile_plot(profile, intensity, output_path, &plot)
            }
        }
    }
}

/// 单文件模式
fn execute_single_file(args: &ProfileArgs) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let format = args
        .format
        .unwrap_or_else(|| guess_format_from_extension(&args.output));
    let job = ProfileJob::from_args(args, format)?;

    let range = job.table.q_grid().range();
    output::print_info(&format!(
        "q range: {:.4} - {:.4} 1/Å, step {:.4} ({} points)",
        range.min_q,
        range.max_q,
        range.delta_q,
        job.table.q_grid().len()
    ));
    output::print_info(&format!(
        "Grouping: {}, method: {:?}, c1 = {}, c2 = {}",
        job.options.grouping, job.options.method, job.options.c1, job.options.c2
    ));

    let spinner = progress::create_spinner("Computing Debye sum");
    let result = job.run(&args.input, &args.output);
    spinner.finish_and_clear();
    let (particle, profile, intensity) = result?;

    output::print_success(&format!(
        "Loaded structure: {} ({} scatterers, Rg = {:.2} Å, Dmax <= {:.2} Å)",
        particle.name,
        particle.len(),
        particle.radius_of_gyration(),
        particle.max_extent()
    ));
    print_composition(&particle);
    print_profile_table(&profile, &intensity, args.summary_rows);

    output::print_written(&args.input.display().to_string(), &args.output.display().to_string());
    Ok(())
}

/// 批量处理模式
fn execute_batch(args: &ProfileArgs) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} structure files", files.len()));

    fs::create_dir_all(&args.output).map_err(|e| SaxsError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    let format = args.format.unwrap_or(ProfileOutputFormat::Dat);
    output::print_info(&format!("Output format: {:?}", format));

    // 形状因子表只构建一次，所有线程共享只读引用
    let job = ProfileJob::from_args(args, format)?;

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files, |file| {
        process_batch_file(file, &job, &args.output, args.overwrite)
    })?;

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} skipped, {} failed",
        result.success, result.skipped, result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    Ok(())
}

/// 批量输出文件名: <stem>_saxs.<ext>
fn batch_output_path(input: &Path, output_dir: &Path, format: ProfileOutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output_dir.join(format!("{}_saxs.{}", stem, format.extension()))
}

/// 处理批量模式中的单个文件
fn process_batch_file(
    input: &PathBuf,
    job: &ProfileJob,
    output_dir: &Path,
    overwrite: bool,
) -> ProcessResult {
    let output_file = batch_output_path(input, output_dir, job.format);

    if output_file.exists() && !overwrite {
        return ProcessResult::Skipped(format!(
            "Output exists, skipping: {}",
            output_file.display()
        ));
    }

    match job.run(input, &output_file) {
        Ok((particle, _, _)) => {
            debug!("{}: {} scatterers", particle.name, particle.len());
            ProcessResult::Success(format!("{} -> {}", input.display(), output_file.display()))
        }
        Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
    }
}

/// 从文件扩展名推断输出格式
pub(crate) fn guess_format_from_extension(path: &Path) -> ProfileOutputFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("csv") => ProfileOutputFormat::Csv,
        Some("png") => ProfileOutputFormat::Png,
        Some("svg") => ProfileOutputFormat::Svg,
        _ => ProfileOutputFormat::Dat,
    }
}

/// 打印基团组成
fn print_composition(particle: &Particle) {
    let summary: Vec<String> = particle
        .composition()
        .iter()
        .map(|(g, n)| format!("{}×{}", g, n))
        .collect();
    output::print_info(&format!("Composition: {}", summary.join(" ")));
}

/// 在 q 网格上均匀抽样的行号
pub(crate) fn sample_indices(len: usize, count: usize) -> Vec<usize> {
    if len == 0 || count == 0 {
        return Vec::new();
    }
    if count >= len {
        return (0..len).collect();
    }
    if count == 1 {
        return vec![0];
    }
    let mut indices: Vec<usize> = (0..count)
        .map(|i| i * (len - 1) / (count - 1))
        .collect();
    indices.dedup();
    indices
}

/// 打印强度曲线摘要表格
pub(crate) fn print_profile_table(profile: &Profile, intensity: &[f64], count: usize) {
    use crate::saxs::PartialProfile;
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct ProfileRow {
        #[tabled(rename = "q (1/Å)")]
        q: String,
        #[tabled(rename = "I(q)")]
        intensity: String,
        #[tabled(rename = "vac_vac")]
        vac_vac: String,
        #[tabled(rename = "dum_dum")]
        dum_dum: String,
        #[tabled(rename = "vac_dum")]
        vac_dum: String,
    }

    let rows: Vec<ProfileRow> = sample_indices(profile.len(), count)
        .into_iter()
        .map(|k| ProfileRow {
            q: format!("{:.4}", profile.all_q()[k]),
            intensity: format!("{:.4e}", intensity[k]),
            vac_vac: format!("{:.4e}", profile.partial(PartialProfile::VacVac)[k]),
            dum_dum: format!("{:.4e}", profile.partial(PartialProfile::DumDum)[k]),
            vac_dum: format!("{:.4e}", profile.partial(PartialProfile::VacDum)[k]),
        })
        .collect();

    if !rows.is_empty() {
        output::print_header(&format!("I(q) at {} q samples", rows.len()));
        let table = Table::new(&rows);
        println!("{}", table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_indices() {
        assert_eq!(sample_indices(101, 5), vec![0, 25, 50, 75, 100]);
        assert_eq!(sample_indices(3, 10), vec![0, 1, 2]);
        assert_eq!(sample_indices(10, 1), vec![0]);
        assert!(sample_indices(0, 5).is_empty());
    }

    #[test]
    fn test_guess_format() {
        assert_eq!(guess_format_from_extension(Path::new("a.CSV")), ProfileOutputFormat::Csv);
        assert_eq!(guess_format_from_extension(Path::new("a.svg")), ProfileOutputFormat::Svg);
        assert_eq!(guess_format_from_extension(Path::new("a.dat")), ProfileOutputFormat::Dat);
        assert_eq!(guess_format_from_extension(Path::new("a")), ProfileOutputFormat::Dat);
    }

    #[test]
    fn test_batch_output_path() {
        let p = batch_output_path(Path::new("in/1abc.pdb"), Path::new("out"), ProfileOutputFormat::Csv);
        assert_eq!(p, Path::new("out").join("1abc_saxs.csv"));
    }
}
