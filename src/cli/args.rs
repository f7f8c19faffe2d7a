//! Command-line argument definitions for the `visim` tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Read, edit and run VISIM geostatistical simulation files
#[derive(Debug, Clone, Parser)]
#[command(
    name = "visim",
    version,
    about = "Read, edit and run VISIM geostatistical simulation files",
    long_about = "Decodes VISIM parameter files, GEO-EAS data files and simulation or \
                  estimation output, summarises their contents, rewrites parameter files \
                  with overrides and runs the VISIM engine over batches of parameter files."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Decode a parameter file, optionally override fields and write it back out
    Params(ParamsArgs),
    /// Decode a GEO-EAS data file and print per-column statistics
    Data(DataArgs),
    /// Decode a simulation or estimation output file and print statistics
    Output(OutputArgs),
    /// Run the engine over one or more parameter files
    Run(RunArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct ParamsArgs {
    /// Parameter file to decode
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Override the number of realizations
    #[arg(long, value_name = "N")]
    pub nsim: Option<usize>,

    /// Override the output file path
    #[arg(long, value_name = "PATH")]
    pub outfl: Option<String>,

    /// Override the random seed
    #[arg(long, value_name = "SEED")]
    pub seed: Option<i64>,

    /// Write the (possibly modified) parameters here
    #[arg(short = 'w', long = "write", value_name = "OUT")]
    pub write: Option<PathBuf>,
}

#[derive(Debug, Clone, Parser)]
pub struct DataArgs {
    /// GEO-EAS file to decode
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct OutputArgs {
    /// Output file to decode
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Treat the file as estimation output (mean and variance columns)
    #[arg(short = 'e', long)]
    pub estimation: bool,

    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct RunArgs {
    /// Parameter files to run
    #[arg(value_name = "PARFILE", required = true)]
    pub par_files: Vec<PathBuf>,

    /// Engine executable (name on PATH or a path)
    #[arg(long = "exe", value_name = "PATH")]
    pub executable: Option<String>,

    /// Directory to run the engine in (default: each parameter file's directory)
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Simulations to run at once (0: one per CPU)
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Attempts per simulation before giving up on a non-zero exit
    #[arg(long, value_name = "N")]
    pub attempts: Option<usize>,

    /// TOML file with runner settings
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip summarising each run's output file
    #[arg(long)]
    pub no_summary: bool,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["visim", "data", "points.eas", "-vv"]).unwrap();
        assert_eq!(args.log_level(), "debug");
        assert!(matches!(args.command, Some(Commands::Data(_))));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["visim", "-q", "-v", "data", "x.eas"]).is_err());
        let args = Args::try_parse_from(["visim", "-q", "data", "x.eas"]).unwrap();
        assert_eq!(args.log_level(), "error");
    }

    #[test]
    fn test_params_overrides() {
        let args = Args::try_parse_from([
            "visim", "params", "sim.par", "--nsim", "20", "--outfl", "out.sim", "-w", "new.par",
        ])
        .unwrap();
        match args.command {
            Some(Commands::Params(params)) => {
                assert_eq!(params.nsim, Some(20));
                assert_eq!(params.outfl.as_deref(), Some("out.sim"));
                assert_eq!(params.write, Some(PathBuf::from("new.par")));
                assert_eq!(params.seed, None);
            }
            other => panic!("Expected params command, got {:?}", other),
        }
    }

    #[test]
    fn test_run_needs_a_parameter_file() {
        assert!(Args::try_parse_from(["visim", "run"]).is_err());
        let args =
            Args::try_parse_from(["visim", "run", "a.par", "b.par", "-j", "2", "--attempts", "3"])
                .unwrap();
        match args.command {
            Some(Commands::Run(run)) => {
                assert_eq!(run.par_files.len(), 2);
                assert_eq!(run.jobs, Some(2));
                assert_eq!(run.attempts, Some(3));
            }
            other => panic!("Expected run command, got {:?}", other),
        }
    }
}
