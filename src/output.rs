//! Simulation and estimation output reading.
//!
//! A simulation output file has a title line, a `label: <nsim>` line, a
//! `label: <nx> x <ny> x <nz>` line and then one value per line, realization
//! after realization. Blank lines and `*` comment lines are ignored, and so
//! are lines that do not parse as a number: the engine sometimes writes stray
//! annotation lines into the value stream. The value count must match the
//! header exactly.
//!
//! Estimation output shares the GEO-EAS grammar; its first two columns are the
//! kriged mean and variance.

use crate::error::{FileFormat, Result, VisimError};
use crate::models::{EstimationOutput, SimulationOutput};
use crate::numeric::{parse_integer, parse_real};
use crate::scanner::LineScanner;
use crate::tabular::decode_tabular_as;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const FORMAT: FileFormat = FileFormat::SimulationOutput;

/// Decode the text of a simulation output file
pub fn decode_simulation_output(text: &str) -> Result<SimulationOutput> {
    let mut scanner = LineScanner::new(text, FORMAT);

    let (_, title) = scanner.next_raw("title")?;

    let (line, realizations_line) = scanner.next_raw("realization count")?;
    let realizations = parse_count(
        label_value(realizations_line, line, "realization count")?,
        line,
        "realization count",
    )?;

    let (line, extents_line) = scanner.next_raw("grid extents")?;
    let extents = parse_extents(label_value(extents_line, line, "grid extents")?, line)?;

    let mut values = Vec::new();
    let mut skipped = 0usize;
    for (line, text) in scanner.drain_remaining() {
        let text = text.trim();
        if text.is_empty() || text.starts_with('*') {
            continue;
        }
        match parse_real(text) {
            Some(value) => values.push(value),
            None => {
                skipped += 1;
                debug!("Skipping non-numeric output line {}: '{}'", line, text);
            }
        }
    }

    if skipped > 0 {
        warn!("Ignored {} non-numeric lines in simulation output", skipped);
    }

    let output = SimulationOutput::new(title.trim(), realizations, extents, values)?;
    debug!(
        "Decoded simulation output: {} realizations of {}x{}x{}",
        output.realizations, output.nx, output.ny, output.nz
    );
    Ok(output)
}

/// Decode the text of an estimation output file
pub fn decode_estimation_output(text: &str) -> Result<EstimationOutput> {
    let dataset = decode_tabular_as(text, FileFormat::EstimationOutput)?;
    if dataset.variable_count() < 2 {
        return Err(VisimError::SchemaMismatch {
            view: "estimation output (mean, variance)",
            required: 2,
            found: dataset.variable_count(),
        });
    }

    let output = EstimationOutput {
        mean: dataset.rows().iter().map(|row| row[0]).collect(),
        variance: dataset.rows().iter().map(|row| row[1]).collect(),
    };
    debug!("Decoded estimation output with {} nodes", output.node_count());
    Ok(output)
}

/// Read and decode a simulation output file from disk
pub fn read_simulation_output(path: &Path) -> Result<SimulationOutput> {
    let text = fs::read_to_string(path)?;
    decode_simulation_output(&text)
}

/// Read and decode an estimation output file from disk
pub fn read_estimation_output(path: &Path) -> Result<EstimationOutput> {
    let text = fs::read_to_string(path)?;
    decode_estimation_output(&text)
}

/// Text after the first `:` of a header line
fn label_value<'a>(text: &'a str, line: usize, field: &str) -> Result<&'a str> {
    text.split_once(':')
        .map(|(_, value)| value.trim())
        .ok_or_else(|| VisimError::FieldCountMismatch {
            format: FORMAT,
            line,
            field: format!("{} (label: value)", field),
            expected: 2,
            found: 1,
        })
}

fn parse_count(token: &str, line: usize, field: &str) -> Result<usize> {
    parse_integer(token).ok_or_else(|| VisimError::NumericParse {
        format: FORMAT,
        line,
        field: field.to_string(),
        token: token.to_string(),
    })
}

/// `<nx> x <ny> x <nz>`, whitespace-tolerant
fn parse_extents(text: &str, line: usize) -> Result<(usize, usize, usize)> {
    let parts: Vec<&str> = text.split(['x', 'X']).map(str::trim).collect();
    if parts.len() != 3 {
        return Err(VisimError::FieldCountMismatch {
            format: FORMAT,
            line,
            field: "grid extents (nx x ny x nz)".to_string(),
            expected: 3,
            found: parts.len(),
        });
    }

    Ok((
        parse_count(parts[0], line, "nx")?,
        parse_count(parts[1], line, "ny")?,
        parse_count(parts[2], line, "nz")?,
    ))
}
