use clap::{CommandFactory, Parser};
use std::process;
use visim_io::cli::{args::Args, commands};

fn main() {
    let args = Args::parse();

    // No subcommand: show help rather than doing nothing
    if args.command.is_none() {
        let _ = Args::command().print_help();
        println!();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result: anyhow::Result<()> = runtime.block_on(async {
        // Dropping the command future kills any engine processes still running
        tokio::select! {
            result = commands::run(args) => result,
            signal = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                match signal {
                    Ok(()) => Err(visim_io::VisimError::processing_interrupted(
                        "Interrupted by user",
                    )
                    .into()),
                    Err(e) => Err(anyhow::Error::new(e).context("Failed to listen for CTRL+C")),
                }
            }
        }
    });

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}
