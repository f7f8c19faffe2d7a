//! VISIM file exchange library.
//!
//! Readers and writers for the plain-text formats the VISIM sequential
//! simulation engine consumes and produces, plus helpers around them:
//! - Parameter files (`parameters`): fixed line order after a
//!   `START OF PARAMETERS` marker, with a variable-length variogram block
//! - GEO-EAS tabular files (`tabular`)
//! - Simulation and estimation output (`output`), reshaped onto the grid by
//!   `grid` and summarised by `stats`
//! - Running the engine over batches of parameter files (`runner`)

pub mod config;
pub mod error;
pub mod grid;
pub mod models;
pub mod numeric;
pub mod output;
pub mod parameters;
pub mod runner;
pub mod stats;
pub mod tabular;

mod scanner;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

pub use config::RunnerConfig;
pub use error::{FileFormat, Result, VisimError};
pub use grid::{Grid3D, to_grid};
pub use models::{
    AxisGeometry, DataColumns, EstimationOutput, ParameterSet, PointCloud, SearchEllipsoid,
    SimulationOutput, TabularDataset, TailExtrapolation, TailOption, VariogramStructure,
};
pub use output::{
    decode_estimation_output, decode_simulation_output, read_estimation_output,
    read_simulation_output,
};
pub use parameters::{
    decode_parameters, encode_parameters, read_parameter_file, write_parameter_file,
};
pub use runner::{RunResult, find_executable, run_batch, run_simulation};
pub use stats::{Summary, summarize};
pub use tabular::{decode_tabular, encode_tabular, read_tabular_file, write_tabular_file};
