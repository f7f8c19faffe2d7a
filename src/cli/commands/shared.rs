//! Logging setup and terminal formatting shared by the commands.

use crate::cli::args::Args;
use crate::stats::Summary;
use colored::*;
use tracing::debug;

/// Install the stderr tracing subscriber; `RUST_LOG` overrides the flags
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("visim_io={}", log_level)));

    let layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr);

    // try_init: a subscriber may already be installed when running under tests
    let installed = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_timer(fmt::time::uptime()))
            .try_init()
    };

    if installed.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}

/// Print a titled section header
pub fn print_heading(title: &str) {
    println!("{}", title.bright_green().bold());
}

/// Print one `label value` line
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", format!("{}:", label).bright_cyan(), value);
}

/// Print the statistics of one named set of values
pub fn print_summary(label: &str, summary: Option<&Summary>) {
    match summary {
        Some(s) => println!(
            "  {:<16} n={:<8} mean={:<12} std={:<12} min={:<12} max={}",
            label.bright_cyan(),
            s.count,
            format_stat(s.mean),
            format_stat(s.std),
            format_stat(s.min),
            format_stat(s.max)
        ),
        None => println!("  {:<16} {}", label.bright_cyan(), "no values".yellow()),
    }
}

pub fn format_stat(value: f64) -> String {
    if value != 0.0 && (value.abs() >= 1e6 || value.abs() < 1e-3) {
        format!("{:.4e}", value)
    } else {
        format!("{:.4}", value)
    }
}
