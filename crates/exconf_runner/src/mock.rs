//! Mock shell runner for testing.
//!
//! Captures every call and returns predefined responses, so callers can be
//! tested without spawning processes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;

use crate::error::{RunnerError, RunnerResult};
use crate::runner::{ExecutionResult, ShellRunner};

/// Predefined mock response for a command execution.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Captured call information for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCall {
    pub work_dir: PathBuf,
    pub command: String,
}

/// Mock shell runner.
#[derive(Clone, Default)]
pub struct MockShell {
    responses: Arc<RwLock<Vec<MockResponse>>>,
    response_index: Arc<AtomicUsize>,
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl MockShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mock response for the next call.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Make every call fail with `ExecutionFailed`.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    fn next_response(&self) -> MockResponse {
        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success("");
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses[index % responses.len()].clone()
    }
}

impl ShellRunner for MockShell {
    fn run(&self, work_dir: &Path, command: &str) -> RunnerResult<ExecutionResult> {
        self.captured_calls.write().push(CapturedCall {
            work_dir: work_dir.to_path_buf(),
            command: command.to_string(),
        });

        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(RunnerError::ExecutionFailed(msg));
        }

        let response = self.next_response();
        let now = Utc::now();
        Ok(ExecutionResult {
            exit_code: response.exit_code,
            stdout: response.stdout,
            stderr: response.stderr,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_captures_calls() {
        let shell = MockShell::new().add_response(MockResponse::success("done"));
        let result = shell.run(Path::new("/tmp/work"), "./run.sh").unwrap();

        assert!(result.success());
        assert_eq!(result.stdout, "done");
        assert_eq!(
            shell.get_calls(),
            vec![CapturedCall {
                work_dir: PathBuf::from("/tmp/work"),
                command: "./run.sh".to_string(),
            }]
        );
    }

    #[test]
    fn test_mock_sequential_responses() {
        let shell = MockShell::new()
            .add_response(MockResponse::success("one"))
            .add_response(MockResponse::failure(3, "boom"));

        let first = shell.run(Path::new("."), "a").unwrap();
        let second = shell.run(Path::new("."), "b").unwrap();
        assert_eq!(first.stdout, "one");
        assert_eq!(second.exit_code, 3);
        assert_eq!(second.combined_output(), "boom");
        assert_eq!(shell.call_count(), 2);
    }

    #[test]
    fn test_mock_simulated_failure() {
        let shell = MockShell::new().simulate_failure("no shell");
        let err = shell.run(Path::new("."), "x").unwrap_err();
        assert!(matches!(err, RunnerError::ExecutionFailed(ref m) if m == "no shell"));
    }
}
