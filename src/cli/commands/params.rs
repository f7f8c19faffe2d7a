//! `visim params`: inspect and rewrite a parameter file.

use super::shared::{print_field, print_heading};
use crate::cli::args::ParamsArgs;
use crate::models::ParameterSet;
use crate::parameters::{read_parameter_file, write_parameter_file};
use anyhow::Context;
use colored::*;
use tracing::{info, warn};

pub fn run_params(args: ParamsArgs) -> anyhow::Result<()> {
    let mut params = read_parameter_file(&args.file)
        .with_context(|| format!("Failed to read parameter file {}", args.file.display()))?;

    let changed = apply_overrides(&mut params, &args);
    print_parameters(&params, &args.file.display().to_string());

    match &args.write {
        Some(out) => {
            write_parameter_file(out, &params)
                .with_context(|| format!("Failed to write parameter file {}", out.display()))?;
            info!("Wrote parameters to {}", out.display());
            println!("\n{} {}", "Wrote".bright_green(), out.display());
        }
        None if changed => warn!("Overrides were applied but no --write target was given"),
        None => {}
    }

    Ok(())
}

/// Apply command-line overrides; true when anything changed
fn apply_overrides(params: &mut ParameterSet, args: &ParamsArgs) -> bool {
    let mut changed = false;
    if let Some(nsim) = args.nsim {
        params.realizations = nsim;
        changed = true;
    }
    if let Some(outfl) = &args.outfl {
        params.output_file = outfl.clone();
        changed = true;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
        changed = true;
    }
    changed
}

fn print_parameters(params: &ParameterSet, source: &str) {
    print_heading(&format!("VISIM parameters ({})", source));

    let (nx, ny, nz) = params.grid_dims();
    let nodes = params
        .node_count()
        .map_or_else(|| "overflow".to_string(), |n| n.to_string());

    print_field("Conditioning", params.conditioning);
    print_field("Data file", &params.data_file);
    print_field("Output file", &params.output_file);
    print_field("Realizations", params.realizations);
    print_field("Grid", format!("{} x {} x {} ({} nodes)", nx, ny, nz, nodes));
    print_field(
        "Cell size",
        format!(
            "{} x {} x {}",
            params.grid_x.cell_size, params.grid_y.cell_size, params.grid_z.cell_size
        ),
    );
    print_field("Seed", params.seed);
    print_field(
        "Global mean/variance",
        format!("{} / {}", params.global_mean, params.global_variance),
    );
    print_field("Nugget", params.nugget);
    print_field("Structures", params.nst());
    for (index, structure) in params.variogram.iter().enumerate() {
        println!(
            "    {} type={} cc={} ranges={:?} angles={:?}",
            format!("#{}", index + 1).bright_white(),
            structure.model_type,
            structure.contribution,
            structure.ranges,
            structure.angles
        );
    }
    print_field("Total sill", params.total_sill());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> ParamsArgs {
        ParamsArgs {
            file: PathBuf::from("in.par"),
            nsim: None,
            outfl: None,
            seed: None,
            write: None,
        }
    }

    #[test]
    fn test_no_overrides_leaves_parameters_alone() {
        let mut params = ParameterSet::default();
        assert!(!apply_overrides(&mut params, &args()));
        assert_eq!(params, ParameterSet::default());
    }

    #[test]
    fn test_overrides_are_applied() {
        let mut params = ParameterSet::default();
        let args = ParamsArgs {
            nsim: Some(25),
            outfl: Some("case.out".to_string()),
            seed: Some(7),
            ..args()
        };
        assert!(apply_overrides(&mut params, &args));
        assert_eq!(params.realizations, 25);
        assert_eq!(params.output_file, "case.out");
        assert_eq!(params.seed, 7);
    }
}
