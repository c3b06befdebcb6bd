//! # table 子命令实现
//!
//! 打印或导出形状因子表（真空/虚原子形状因子随 q 的变化）。
//!
//! ## 依赖关系
//! - 使用 `cli/table.rs` 定义的 TableArgs
//! - 使用 `saxs/table.rs`
//! - 使用 `tabled` 打印摘要，`csv` 导出完整表

use crate::cli::table::TableArgs;
use crate::error::{Result, SaxsError};
use crate::saxs::{FormFactorGroup, FormFactorTable, TableSource};
use crate::utils::output;

use std::path::Path;

/// 执行 table 子命令
pub fn execute(args: TableArgs) -> Result<()> {
    output::print_header("Form Factor Table");

    let range = args.q.resolve()?;
    let table = FormFactorTable::new(
        args.ff_table.as_deref(),
        range.min_q,
        range.max_q,
        range.delta_q,
    )?;

    match table.source() {
        TableSource::BuiltIn => output::print_info("Source: built-in coefficients"),
        TableSource::File(path) => output::print_info(&format!("Source: {}", path.display())),
    }

    let groups = select_groups(&table, args.groups.as_deref())?;

    match &args.output {
        Some(path) => {
            write_table_csv(&table, &groups, path)?;
            output::print_success(&format!(
                "{} groups x {} q points written to '{}'",
                groups.len(),
                table.q_grid().len(),
                path.display()
            ));
        }
        None => print_summary(&table, &groups),
    }
    Ok(())
}

/// 解析 `--groups`；未指定时返回表中全部基团
fn select_groups(table: &FormFactorTable, names: Option<&str>) -> Result<Vec<FormFactorGroup>> {
    let Some(names) = names else {
        return Ok(table.groups().to_vec());
    };

    names.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|symbol| {
            let group = FormFactorGroup::from_symbol(symbol)
                .ok_or_else(|| SaxsError::InvalidArgument(format!("unknown group '{}'", symbol)))?;
            table.row(group)?;
            Ok(group)
        })
        .collect()
}

/// 导出完整表
fn write_table_csv(table: &FormFactorTable, groups: &[FormFactorGroup], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["group", "q", "vacuum", "dummy"])?;

    for &group in groups {
        let row = table.row(group)?;
        let vacuum = &table.vacuum_form_factors()[row];
        let dummy = &table.dummy_form_factors()[row];
        for (k, q) in table.q_grid().values().iter().enumerate() {
            wtr.write_record(&[
                group.symbol().to_string(),
                format!("{:.6}", q),
                format!("{:.8e}", vacuum[k]),
                format!("{:.8e}", dummy[k]),
            ])?;
        }
    }

    wtr.flush().map_err(|e| SaxsError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

/// 打印 q 首末两点的形状因子与排除体积
fn print_summary(table: &FormFactorTable, groups: &[FormFactorGroup]) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct GroupRow {
        #[tabled(rename = "Group")]
        group: String,
        #[tabled(rename = "V (Å³)")]
        volume: String,
        #[tabled(rename = "f_vac(q_min)")]
        vacuum_first: String,
        #[tabled(rename = "f_dum(q_min)")]
        dummy_first: String,
        #[tabled(rename = "f_vac(q_max)")]
        vacuum_last: String,
        #[tabled(rename = "f_dum(q_max)")]
        dummy_last: String,
    }

    let last = table.q_grid().len() - 1;
    let rows: Vec<GroupRow> = groups
        .iter()
        .filter_map(|&g| {
            let row = table.row(g).ok()?;
            let coefficients = table.coefficients(g).ok()?;
            let vacuum = &table.vacuum_form_factors()[row];
            let dummy = &table.dummy_form_factors()[row];
            Some(GroupRow {
                group: g.symbol().to_string(),
                volume: format!("{:.2}", coefficients.excluded_volume),
                vacuum_first: format!("{:.4}", vacuum[0]),
                dummy_first: format!("{:.4}", dummy[0]),
                vacuum_last: format!("{:.4}", vacuum[last]),
                dummy_last: format!("{:.4}", dummy[last]),
            })
        })
        .collect();

    let table = Table::new(&rows);
    println!("{}", table);
}
