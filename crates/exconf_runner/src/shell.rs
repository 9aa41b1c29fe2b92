//! Shell runner backed by the system shell.
//!
//! Commands run through `sh -c` (or `cmd /C` on Windows) with the work
//! directory as the current directory. Output is captured line by line and
//! optionally echoed to the terminal while the command runs.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::error::{RunnerError, RunnerResult};
use crate::runner::{ExecutionResult, ShellRunner};

/// Output stream of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// System shell runner options.
#[derive(Debug, Clone)]
pub struct SystemShellOptions {
    /// Echo command output to the terminal while capturing it
    pub stream_output: bool,
}

impl Default for SystemShellOptions {
    fn default() -> Self {
        Self {
            stream_output: true,
        }
    }
}

impl SystemShellOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet(mut self) -> Self {
        self.stream_output = false;
        self
    }
}

/// Runs commands with the platform shell.
#[derive(Debug, Clone, Default)]
pub struct SystemShell {
    options: SystemShellOptions,
}

impl SystemShell {
    pub fn new(options: SystemShellOptions) -> Self {
        Self { options }
    }

    fn shell_command(command: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }

    /// Read a stream to the end on its own thread, echoing lines if enabled.
    fn collect<R>(reader: R, stream: LogStream, echo: bool) -> thread::JoinHandle<String>
    where
        R: Read + Send + 'static,
    {
        thread::spawn(move || {
            let mut output = String::new();
            for line in BufReader::new(reader).lines().map_while(Result::ok) {
                if echo {
                    match stream {
                        LogStream::Stdout => println!("{}", line),
                        LogStream::Stderr => eprintln!("{}", line),
                    }
                }
                output.push_str(&line);
                output.push('\n');
            }
            output
        })
    }
}

impl ShellRunner for SystemShell {
    fn run(&self, work_dir: &Path, command: &str) -> RunnerResult<ExecutionResult> {
        if !work_dir.is_dir() {
            return Err(RunnerError::InvalidWorkDir(work_dir.display().to_string()));
        }
        info!("Calling shell ({}):\n{}", work_dir.display(), command);

        let started_at = Utc::now();
        let mut child = Self::shell_command(command)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RunnerError::ExecutionFailed(format!("Failed to spawn shell: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stderr was not captured".to_string()))?;

        let echo = self.options.stream_output;
        let stdout_handle = Self::collect(stdout, LogStream::Stdout, echo);
        let stderr_handle = Self::collect(stderr, LogStream::Stderr, echo);

        let status = child.wait().map_err(|e| {
            RunnerError::ExecutionFailed(format!("Failed to wait for process: {}", e))
        })?;

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();
        let finished_at = Utc::now();
        let exit_code = status.code().unwrap_or(-1);

        if exit_code != 0 {
            error!("Running shell failed with return code: {}", exit_code);
        } else {
            debug!("Shell command finished successfully");
        }

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
            started_at,
            finished_at,
            duration_ms: (finished_at - started_at).num_milliseconds().max(0) as u64,
        })
    }
}
