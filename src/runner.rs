//! Running the VISIM engine.
//!
//! The engine is an external program invoked as `<exe> <parameter file>`. A
//! run's output file is taken from the parameter file's `outfl` field; when
//! that file cannot be decoded, the engine's stdout is scanned for the path
//! instead.

use crate::config::{DEFAULT_EXECUTABLE, EXECUTABLE_ENV, RunnerConfig};
use crate::error::{Result, VisimError};
use crate::parameters::read_parameter_file;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use serde::Serialize;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Places a checkout of the engine sources usually leaves the binary
const LEGACY_LOCATIONS: &[&str] = &[
    "./visim_f90",
    "../src_f90/visim_f90",
    "../../src_f90/visim_f90",
    "../visim_f90",
    "./src_f90/visim_f90",
];

static OUTPUT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Output written to:|file for output").expect("output line pattern is valid")
});

/// Outcome of one engine run
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub parameter_file: PathBuf,
    pub success: bool,
    /// `None` when the engine was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
    pub output_file: Option<PathBuf>,
    pub attempts: usize,
}

/// Run the engine once per attempt on `par_file` until it exits zero or
/// `max_attempts` is used up
pub async fn run_simulation(par_file: &Path, config: &RunnerConfig) -> Result<RunResult> {
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let mut result = run_once(par_file, config).await?;
        result.attempts = attempt;
        if result.success || attempt >= max_attempts {
            return Ok(result);
        }
        warn!(
            "{} exited with {:?} (attempt {}/{}), retrying",
            par_file.display(),
            result.exit_code,
            attempt,
            max_attempts
        );
        attempt += 1;
    }
}

/// Run every parameter file, at most `max_concurrent_runs` at a time.
///
/// Results come back in input order, one per file; a failed run never stops
/// the others.
pub async fn run_batch(par_files: &[PathBuf], config: &RunnerConfig) -> Vec<Result<RunResult>> {
    let start = Instant::now();
    let concurrency = config.max_concurrent_runs.max(1);
    info!(
        "Running batch of {} simulations ({} at a time)",
        par_files.len(),
        concurrency
    );

    let progress = batch_progress(par_files.len() as u64, config.show_progress);

    let results: Vec<Result<RunResult>> = stream::iter(par_files)
        .map(|par_file| {
            let progress = progress.clone();
            async move {
                let result = run_simulation(par_file, config).await;
                match &result {
                    Ok(run) if run.success => debug!("{} finished", par_file.display()),
                    Ok(run) => warn!(
                        "{} failed with exit code {:?}, continuing",
                        par_file.display(),
                        run.exit_code
                    ),
                    Err(e) => warn!("{} could not be run: {}", par_file.display(), e),
                }
                progress.inc(1);
                result
            }
        })
        .buffered(concurrency)
        .collect()
        .await;

    progress.finish_and_clear();

    let succeeded = results
        .iter()
        .filter(|r| matches!(r, Ok(run) if run.success))
        .count();
    let engine_time: Duration = results.iter().flatten().map(|run| run.elapsed).sum();
    info!(
        "Batch finished: {} total, {} succeeded, {} failed, {:.1}s engine time, {:.1}s wall time",
        results.len(),
        succeeded,
        results.len() - succeeded,
        engine_time.as_secs_f64(),
        start.elapsed().as_secs_f64()
    );

    results
}

/// Locate the engine: `VISIM_EXE`, then `PATH`, then the legacy checkout paths
pub fn find_executable(name: &str) -> Option<PathBuf> {
    find_executable_with(
        name,
        std::env::var(EXECUTABLE_ENV).ok(),
        std::env::var_os("PATH"),
    )
}

fn find_executable_with(
    name: &str,
    env_exe: Option<String>,
    path_var: Option<OsString>,
) -> Option<PathBuf> {
    if let Some(exe) = env_exe.filter(|v| !v.trim().is_empty()) {
        let exe = PathBuf::from(exe);
        if is_executable(&exe) {
            return Some(exe);
        }
        warn!("{} points at {}, which is not executable", EXECUTABLE_ENV, exe.display());
    }

    if let Some(found) = path_var
        .iter()
        .flat_map(std::env::split_paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
    {
        return Some(found);
    }

    if name != DEFAULT_EXECUTABLE {
        return None;
    }
    LEGACY_LOCATIONS
        .iter()
        .map(PathBuf::from)
        .find(|candidate| is_executable(candidate))
        .and_then(|candidate| candidate.canonicalize().ok())
}

/// Output path announced on the engine's stdout; the last announcement wins
pub fn output_path_from_stdout(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .filter(|line| OUTPUT_LINE.is_match(line))
        .filter_map(|line| line.rsplit_once(':'))
        .map(|(_, path)| path.trim())
        .filter(|path| !path.is_empty())
        .last()
        .map(str::to_string)
}

/// `path` as-is when absolute, otherwise under `working_dir`
pub fn resolve_output_path(path: &str, working_dir: &Path) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

async fn run_once(par_file: &Path, config: &RunnerConfig) -> Result<RunResult> {
    let par_file = tokio::fs::canonicalize(par_file)
        .await
        .map_err(|_| VisimError::ParameterFileNotFound {
            path: par_file.to_path_buf(),
        })?;

    // The engine gets a bare file name when it runs beside its parameter file
    let (working_dir, par_arg) = match &config.working_dir {
        Some(dir) => (dir.clone(), par_file.clone().into_os_string()),
        None => match (par_file.parent(), par_file.file_name()) {
            (Some(dir), Some(name)) => (dir.to_path_buf(), name.to_os_string()),
            _ => (PathBuf::from("."), par_file.clone().into_os_string()),
        },
    };

    let declared_output = match read_parameter_file(&par_file) {
        Ok(params) => Some(params.output_file),
        Err(e) => {
            warn!(
                "Could not decode {} ({}); output path will come from engine stdout",
                par_file.display(),
                e
            );
            None
        }
    };

    let program = program_path(&config.executable);
    debug!(
        "Running {} {} in {}",
        program.display(),
        par_arg.to_string_lossy(),
        working_dir.display()
    );

    let start = Instant::now();
    let mut child = Command::new(&program)
        .arg(&par_arg)
        .current_dir(&working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => VisimError::ExecutableNotFound {
                name: config.executable.clone(),
            },
            _ => VisimError::Io(e),
        })?;

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let verbose = config.verbose;

    let read_stdout = async move {
        let mut captured = String::new();
        if let Some(pipe) = stdout_pipe {
            let mut lines = BufReader::new(pipe).lines();
            while let Some(line) = lines.next_line().await? {
                if verbose {
                    info!(target: "visim_io::engine", "{}", line);
                }
                captured.push_str(&line);
                captured.push('\n');
            }
        }
        Ok::<_, std::io::Error>(captured)
    };
    let read_stderr = async move {
        let mut captured = String::new();
        if let Some(mut pipe) = stderr_pipe {
            pipe.read_to_string(&mut captured).await?;
        }
        Ok::<_, std::io::Error>(captured)
    };

    let (stdout, stderr, status) = tokio::join!(read_stdout, read_stderr, child.wait());
    let (stdout, stderr, status) = (stdout?, stderr?, status?);
    let elapsed = start.elapsed();

    let output_file = declared_output
        .filter(|path| !path.trim().is_empty())
        .or_else(|| output_path_from_stdout(&stdout))
        .map(|path| resolve_output_path(path.trim(), &working_dir));

    if status.success() {
        debug!(
            "{} completed in {:.1}s",
            par_file.display(),
            elapsed.as_secs_f64()
        );
    } else if !stderr.trim().is_empty() {
        debug!("Engine stderr for {}: {}", par_file.display(), stderr.trim());
    }

    Ok(RunResult {
        parameter_file: par_file,
        success: status.success(),
        exit_code: status.code(),
        stdout,
        stderr,
        elapsed,
        output_file,
        attempts: 1,
    })
}

/// Absolute path for explicit paths, a `PATH` hit or the bare name otherwise
fn program_path(executable: &str) -> PathBuf {
    let path = Path::new(executable);
    if path.components().count() > 1 {
        return path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    }
    find_executable_with(executable, None, std::env::var_os("PATH"))
        .unwrap_or_else(|| path.to_path_buf())
}

fn batch_progress(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(len);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} runs {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    progress
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdout_announcement_takes_text_after_last_colon() {
        let stdout = "VISIM version 2\nOutput written to: results/sim.out\nDone\n";
        assert_eq!(
            output_path_from_stdout(stdout),
            Some("results/sim.out".to_string())
        );

        let echoed = "visim.out             - file for output\n";
        assert_eq!(output_path_from_stdout(echoed), None);

        let echoed_with_colon = "reading: file for output: final.out\n";
        assert_eq!(
            output_path_from_stdout(echoed_with_colon),
            Some("final.out".to_string())
        );
    }

    #[test]
    fn test_last_announcement_wins() {
        let stdout = "Output written to: a.out\nOutput written to: b.out\n";
        assert_eq!(output_path_from_stdout(stdout), Some("b.out".to_string()));
        assert_eq!(output_path_from_stdout("nothing here\n"), None);
    }

    #[test]
    fn test_relative_output_resolves_against_working_dir() {
        let dir = Path::new("/runs/case1");
        assert_eq!(
            resolve_output_path("visim.out", dir),
            PathBuf::from("/runs/case1/visim.out")
        );
        assert_eq!(
            resolve_output_path("/tmp/abs.out", dir),
            PathBuf::from("/tmp/abs.out")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_find_executable_search_order() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let on_path = dir.path().join("visim_test_engine");
        std::fs::write(&on_path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&on_path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let override_exe = dir.path().join("override");
        std::fs::write(&override_exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&override_exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let path_var = Some(dir.path().as_os_str().to_os_string());
        assert_eq!(
            find_executable_with("visim_test_engine", None, path_var.clone()),
            Some(on_path)
        );
        assert_eq!(
            find_executable_with(
                "visim_test_engine",
                Some(override_exe.display().to_string()),
                path_var.clone()
            ),
            Some(override_exe)
        );
        assert_eq!(find_executable_with("missing_engine", None, path_var), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plain"), "data").unwrap();
        let path_var = Some(dir.path().as_os_str().to_os_string());
        assert_eq!(find_executable_with("plain", None, path_var), None);
    }
}
