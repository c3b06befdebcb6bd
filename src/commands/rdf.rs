//! # rdf 子命令实现
//!
//! 统计结构中全部无序原子对的距离直方图并写出 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/rdf.rs` 定义的 RdfArgs
//! - 使用 `saxs/rdf.rs` 与 `saxs/export.rs`
//! - 使用 `parsers/` 读取结构

use crate::cli::rdf::RdfArgs;
use crate::error::{Result, SaxsError};
use crate::models::Particle;
use crate::parsers;
use crate::saxs::{export, RadialDistributionFunction};
use crate::utils::output;

/// 执行 rdf 子命令
pub fn execute(args: RdfArgs) -> Result<()> {
    output::print_header("Pair Distance Distribution");

    if !args.input.is_file() {
        return Err(SaxsError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    let particle = parsers::parse_structure_file(&args.input, args.grouping.into())?;
    output::print_success(&format!(
        "Loaded structure: {} ({} scatterers)",
        particle.name,
        particle.len()
    ));

    let rdf = pair_distribution(&particle, args.bin_size, args.max_distance)?;

    let pairs = particle.len() * particle.len().saturating_sub(1) / 2;
    let counted = rdf.total();
    output::print_info(&format!(
        "{} bins of {:.3} Å up to {:.2} Å, {} of {} pairs counted",
        rdf.nbins(),
        rdf.bin_size(),
        rdf.max_distance(),
        counted,
        pairs
    ));
    if (counted as usize) < pairs {
        output::print_warning(&format!(
            "{} pairs beyond the cutoff were dropped",
            pairs - counted as usize
        ));
    }

    export::rdf_to_csv(&rdf, &args.output)?;
    output::print_written(&args.input.display().to_string(), &args.output.display().to_string());
    Ok(())
}

/// 计算原子对距离直方图；未给出截断时覆盖整个结构
pub fn pair_distribution(
    particle: &Particle,
    bin_size: f64,
    max_distance: Option<f64>,
) -> Result<RadialDistributionFunction> {
    let max_distance = max_distance.unwrap_or_else(|| particle.max_extent() + bin_size);
    let mut rdf = RadialDistributionFunction::new(bin_size, max_distance)?;
    rdf.accumulate_pairs(&particle.positions());
    Ok(rdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Atom;
    use crate::saxs::FormFactorGroup;

    fn chain() -> Particle {
        let atoms = (0..5)
            .map(|i| Atom::new(FormFactorGroup::C, [1.5 * i as f64, 0.0, 0.0]))
            .collect();
        Particle::new("chain", atoms)
    }

    #[test]
    fn test_default_cutoff_keeps_every_pair() {
        let rdf = pair_distribution(&chain(), 0.5, None).unwrap();
        assert_eq!(rdf.total(), 10.0);
    }

    #[test]
    fn test_explicit_cutoff_drops_pairs() {
        // 距离 1.5 (4 对), 3.0 (3 对), 4.5 (2 对), 6.0 (1 对)
        let rdf = pair_distribution(&chain(), 0.5, Some(4.0)).unwrap();
        assert_eq!(rdf.total(), 7.0);
        assert_eq!(rdf.values()[3], 4.0);
        assert_eq!(rdf.values()[6], 3.0);
    }
}
