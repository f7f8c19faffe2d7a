//! Runner configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! the `VISIM_EXE` and `VISIM_MAX_CONCURRENT` environment variables, then
//! whatever the command line sets through the `with_*` builders.

use crate::error::{Result, VisimError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_EXECUTABLE: &str = "visim_f90";
pub const EXECUTABLE_ENV: &str = "VISIM_EXE";
pub const MAX_CONCURRENT_ENV: &str = "VISIM_MAX_CONCURRENT";

/// How the engine is launched and how batches are scheduled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Engine executable name or path
    pub executable: String,

    /// Directory the engine runs in; defaults to the parameter file's directory
    pub working_dir: Option<PathBuf>,

    /// Echo engine stdout through the log
    pub verbose: bool,

    /// Runs in flight at once during a batch
    pub max_concurrent_runs: usize,

    /// Attempts per run before a non-zero exit is reported
    pub max_attempts: usize,

    /// Draw a progress bar during batches
    pub show_progress: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            working_dir: None,
            verbose: false,
            max_concurrent_runs: 1,
            max_attempts: 1,
            show_progress: true,
        }
    }
}

impl RunnerConfig {
    /// Load settings from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!("Loaded runner configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `VISIM_EXE` and `VISIM_MAX_CONCURRENT` from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply environment-style overrides from `lookup`
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(executable) = lookup(EXECUTABLE_ENV).filter(|v| !v.trim().is_empty()) {
            debug!("{} overrides executable: {}", EXECUTABLE_ENV, executable);
            self.executable = executable;
        }

        if let Some(raw) = lookup(MAX_CONCURRENT_ENV) {
            self.max_concurrent_runs = raw.trim().parse().map_err(|_| {
                VisimError::configuration(format!(
                    "{} must be a positive integer, got '{}'",
                    MAX_CONCURRENT_ENV, raw
                ))
            })?;
        }

        Ok(self)
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(working_dir.into());
        self
    }

    pub fn with_max_concurrent_runs(mut self, runs: usize) -> Self {
        self.max_concurrent_runs = runs;
        self
    }

    /// Use one concurrent run per logical CPU
    pub fn with_all_cores(mut self) -> Self {
        self.max_concurrent_runs = num_cpus::get();
        self
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Reject settings no batch could run with
    pub fn validate(&self) -> Result<()> {
        if self.executable.trim().is_empty() {
            return Err(VisimError::configuration("executable must not be empty"));
        }
        if self.max_concurrent_runs == 0 {
            return Err(VisimError::configuration(
                "max_concurrent_runs must be at least 1",
            ));
        }
        if self.max_attempts == 0 {
            return Err(VisimError::configuration("max_attempts must be at least 1"));
        }
        if let Some(dir) = &self.working_dir {
            if !dir.is_dir() {
                return Err(VisimError::configuration(format!(
                    "working directory does not exist: {}",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
