//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while running a shell command.
///
/// A command that runs and exits non-zero is not an error; its exit code is
/// reported in the execution result.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Shell execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Working directory does not exist: {0}")]
    InvalidWorkDir(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
