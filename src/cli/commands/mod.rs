//! Command implementations for the `visim` CLI.
//!
//! Each subcommand lives in its own module; `run` sets up logging and
//! dispatches.

pub mod data;
pub mod output;
pub mod params;
pub mod run;
pub mod shared;

use crate::cli::args::{Args, Commands};

/// Run the subcommand selected in `args`
pub async fn run(args: Args) -> anyhow::Result<()> {
    shared::setup_logging(&args);

    match args.command {
        Some(Commands::Params(params_args)) => params::run_params(params_args),
        Some(Commands::Data(data_args)) => data::run_data(data_args),
        Some(Commands::Output(output_args)) => output::run_output(output_args),
        Some(Commands::Run(run_args)) => run::run_engine(run_args).await,
        None => Ok(()),
    }
}
