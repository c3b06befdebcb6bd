//! # compare 子命令实现
//!
//! 计算结构的强度曲线，与参考目录中的曲线逐条对比；
//! 使用 `--save` 时改为把本次结果写成新的参考集。
//!
//! ## 依赖关系
//! - 使用 `cli/compare.rs` 定义的 CompareArgs
//! - 使用 `saxs/reference.rs`
//! - 使用 `parsers/` 读取结构

use crate::cli::compare::CompareArgs;
use crate::error::{Result, SaxsError};
use crate::parsers;
use crate::saxs::reference::{CurveComparison, ReferenceSet};
use crate::saxs::compute_profile;
use crate::utils::output;

/// 执行 compare 子命令
pub fn execute(args: CompareArgs) -> Result<()> {
    output::print_header("Reference Comparison");

    if !args.input.is_file() {
        return Err(SaxsError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    let options = args.engine.options()?;
    let table = args.engine.table()?;
    let particle = parsers::parse_structure_file(&args.input, options.grouping)?;
    output::print_success(&format!(
        "Loaded structure: {} ({} scatterers)",
        particle.name,
        particle.len()
    ));

    let (profile, intensity) = compute_profile(&particle, &table, None, &options)?;

    if args.save {
        ReferenceSet::from_profile(&profile, &intensity).save(&args.reference)?;
        output::print_success(&format!(
            "Reference set written to '{}'",
            args.reference.display()
        ));
        return Ok(());
    }

    let reference = ReferenceSet::load(&args.reference, args.vac_dum_convention.into())?;
    output::print_info(&format!(
        "rtol = {:.1e}, atol = {:.1e}, vac_dum convention: {:?}",
        args.rtol, args.atol, args.vac_dum_convention
    ));

    let results = reference.compare(&profile, &intensity, args.rtol, args.atol);
    print_comparison_table(&results);

    match results.iter().find(|r| !r.passed) {
        Some(failed) => Err(SaxsError::ReferenceMismatch {
            curve: failed.curve.clone(),
            index: failed.index,
            max_deviation: failed.max_deviation,
        }),
        None => {
            output::print_success("All curves match the reference");
            Ok(())
        }
    }
}

/// 打印对比结果表格
fn print_comparison_table(results: &[CurveComparison]) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct ComparisonRow {
        #[tabled(rename = "Curve")]
        curve: String,
        #[tabled(rename = "Samples")]
        samples: usize,
        #[tabled(rename = "Max |Δ|")]
        max_deviation: String,
        #[tabled(rename = "At index")]
        index: usize,
        #[tabled(rename = "Status")]
        status: String,
    }

    let rows: Vec<ComparisonRow> = results
        .iter()
        .map(|r| ComparisonRow {
            curve: r.curve.clone(),
            samples: r.samples,
            max_deviation: format!("{:.3e}", r.max_deviation),
            index: r.index,
            status: if r.passed { "ok" } else { "MISMATCH" }.to_string(),
        })
        .collect();

    println!("{}", Table::new(&rows));
}
