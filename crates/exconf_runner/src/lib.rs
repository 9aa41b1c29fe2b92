//! # exconf_runner
//!
//! Shell execution for prepared exconf work directories.
//!
//! # Features
//!
//! - **System Shell**: `sh -c` on Unix, `cmd /C` on Windows
//! - **Output Streaming**: Echo output live while capturing it
//! - **Mock Runner**: For testing without spawning processes
//!
//! # Example
//!
//! ```rust,no_run
//! use exconf_runner::{ShellRunner, SystemShell};
//! use std::path::Path;
//!
//! let shell = SystemShell::default();
//! let result = shell.run(Path::new("/tmp/work"), "./run.sh").unwrap();
//! println!("Exit code: {}", result.exit_code);
//! ```

pub mod error;
pub mod mock;
pub mod runner;
pub mod shell;

pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockResponse, MockShell};
pub use runner::{ExecutionResult, ShellRunner};
pub use shell::{LogStream, SystemShell, SystemShellOptions};
