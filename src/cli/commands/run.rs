//! `visim run`: run the engine over a batch of parameter files.

use super::output::report_simulation;
use super::shared::print_heading;
use crate::cli::args::RunArgs;
use crate::config::RunnerConfig;
use crate::output::read_simulation_output;
use crate::runner::{RunResult, run_batch};
use anyhow::{Context, bail};
use colored::*;
use tracing::{debug, warn};

pub async fn run_engine(args: RunArgs) -> anyhow::Result<()> {
    let config = load_configuration(&args)?;
    debug!("Runner configuration: {:?}", config);

    let results = run_batch(&args.par_files, &config).await;

    print_heading("Run summary");
    let mut failed = 0;
    for (par_file, result) in args.par_files.iter().zip(&results) {
        match result {
            Ok(run) if run.success => print_success(run),
            Ok(run) => {
                failed += 1;
                println!(
                    "  {} {} (exit code {}, {} attempt(s))",
                    "FAILED".bright_red().bold(),
                    par_file.display(),
                    run.exit_code
                        .map_or_else(|| "none".to_string(), |code| code.to_string()),
                    run.attempts
                );
                if let Some(line) = run.stderr.lines().rev().find(|l| !l.trim().is_empty()) {
                    println!("         {}", line.trim().red());
                }
            }
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "ERROR".bright_red().bold(), par_file.display(), e);
            }
        }
    }

    if !args.no_summary {
        for run in results.iter().flatten().filter(|run| run.success) {
            summarise_run_output(run);
        }
    }

    if failed > 0 {
        bail!("{} of {} simulations failed", failed, results.len());
    }
    Ok(())
}

/// Defaults, then the config file, then the environment, then flags
fn load_configuration(args: &RunArgs) -> anyhow::Result<RunnerConfig> {
    let mut config = match &args.config {
        Some(path) => RunnerConfig::from_file(path)
            .with_context(|| format!("Failed to load runner config {}", path.display()))?,
        None => RunnerConfig::default(),
    };
    config = config.with_env_overrides()?;

    if let Some(executable) = &args.executable {
        config = config.with_executable(executable.clone());
    }
    if let Some(dir) = &args.working_dir {
        config = config.with_working_dir(dir.clone());
    }
    match args.jobs {
        Some(0) => config = config.with_all_cores(),
        Some(jobs) => config = config.with_max_concurrent_runs(jobs),
        None => {}
    }
    if let Some(attempts) = args.attempts {
        config = config.with_max_attempts(attempts);
    }
    config = config.with_verbose(tracing::enabled!(tracing::Level::INFO));

    config.validate()?;
    Ok(config)
}

fn print_success(run: &RunResult) {
    println!(
        "  {} {} in {:.1}s",
        "OK".bright_green().bold(),
        run.parameter_file.display(),
        run.elapsed.as_secs_f64()
    );
    if let Some(output) = &run.output_file {
        println!("     {} {}", "output:".bright_cyan(), output.display());
    }
}

fn summarise_run_output(run: &RunResult) {
    let Some(path) = &run.output_file else {
        return;
    };
    match read_simulation_output(path) {
        Ok(output) => {
            println!();
            if let Err(e) = report_simulation(&output, &path.display().to_string(), false) {
                warn!("Could not summarise {}: {}", path.display(), e);
            }
        }
        Err(e) => warn!("Could not decode output {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Args, Commands};
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        match Args::try_parse_from(argv).unwrap().command {
            Some(Commands::Run(run)) => run,
            other => panic!("Expected run command, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_jobs_means_one_per_cpu() {
        let config = load_configuration(&run_args(&["visim", "run", "a.par", "-j", "0"])).unwrap();
        assert_eq!(config.max_concurrent_runs, num_cpus::get());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = load_configuration(&run_args(&[
            "visim", "run", "a.par", "-j", "3", "--attempts", "2", "--exe", "visim_local",
        ]))
        .unwrap();
        assert_eq!(config.max_concurrent_runs, 3);
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.executable, "visim_local");
    }
}
