//! `visim output`: summarise simulation or estimation output.

use super::shared::{print_field, print_heading, print_summary};
use crate::cli::args::OutputArgs;
use crate::models::SimulationOutput;
use crate::output::{read_estimation_output, read_simulation_output};
use crate::stats::{OutputSummary, Summary, summarize, summarize_output};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;

/// Realizations listed individually before the listing is cut short
const MAX_LISTED_REALIZATIONS: usize = 20;

#[derive(Debug, Serialize)]
struct SimulationReport<'a> {
    title: &'a str,
    realizations: usize,
    grid: (usize, usize, usize),
    #[serde(flatten)]
    summary: Option<OutputSummary>,
}

#[derive(Debug, Serialize)]
struct EstimationReport {
    nodes: usize,
    mean: Option<Summary>,
    variance: Option<Summary>,
    std_dev: Option<Summary>,
}

pub fn run_output(args: OutputArgs) -> anyhow::Result<()> {
    if args.estimation {
        report_estimation(&args.file, args.json)
    } else {
        let output = read_simulation_output(&args.file)
            .with_context(|| format!("Failed to read simulation output {}", args.file.display()))?;
        report_simulation(&output, &args.file.display().to_string(), args.json)
    }
}

/// Print the statistics of a decoded simulation output
pub fn report_simulation(output: &SimulationOutput, source: &str, json: bool) -> anyhow::Result<()> {
    let report = SimulationReport {
        title: &output.title,
        realizations: output.realizations,
        grid: (output.nx, output.ny, output.nz),
        summary: summarize_output(output),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_heading(&format!("Simulation output ({})", source));
    print_field("Title", report.title);
    print_field("Realizations", report.realizations);
    print_field(
        "Grid",
        format!("{} x {} x {}", output.nx, output.ny, output.nz),
    );

    let Some(summary) = &report.summary else {
        print_summary("all values", None);
        return Ok(());
    };
    print_summary("all values", Some(&summary.overall));

    if !output.is_single_realization() {
        let listed = summary
            .realization_means
            .iter()
            .zip(&summary.realization_stds)
            .take(MAX_LISTED_REALIZATIONS);
        for (index, (mean, std)) in listed.enumerate() {
            println!("    realization {:>4}: mean={:.4} std={:.4}", index + 1, mean, std);
        }
        if output.realizations > MAX_LISTED_REALIZATIONS {
            println!(
                "    ... {} more realizations",
                output.realizations - MAX_LISTED_REALIZATIONS
            );
        }
        if let Some(between) = summarize(&summary.realization_means) {
            print_summary("realization means", Some(&between));
        }
    }

    Ok(())
}

fn report_estimation(path: &Path, json: bool) -> anyhow::Result<()> {
    let output = read_estimation_output(path)
        .with_context(|| format!("Failed to read estimation output {}", path.display()))?;
    let report = EstimationReport {
        nodes: output.node_count(),
        mean: summarize(&output.mean),
        variance: summarize(&output.variance),
        std_dev: summarize(&output.std_dev()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_heading(&format!("Estimation output ({})", path.display()));
    print_field("Nodes", report.nodes);
    print_summary("mean", report.mean.as_ref());
    print_summary("variance", report.variance.as_ref());
    print_summary("std dev", report.std_dev.as_ref());
    Ok(())
}
