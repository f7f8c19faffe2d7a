//! `visim data`: summarise a GEO-EAS file.

use super::shared::{print_field, print_heading, print_summary};
use crate::cli::args::DataArgs;
use crate::stats::summarize_columns;
use crate::tabular::read_tabular_file;
use anyhow::Context;

pub fn run_data(args: DataArgs) -> anyhow::Result<()> {
    let dataset = read_tabular_file(&args.file)
        .with_context(|| format!("Failed to read GEO-EAS file {}", args.file.display()))?;
    let columns = summarize_columns(&dataset);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&columns)?);
        return Ok(());
    }

    print_heading(&format!("GEO-EAS data ({})", args.file.display()));
    print_field("Title", &dataset.title);
    print_field("Variables", dataset.variable_count());
    print_field("Records", dataset.row_count());
    println!();
    for column in &columns {
        print_summary(&column.name, column.summary.as_ref());
    }

    Ok(())
}
