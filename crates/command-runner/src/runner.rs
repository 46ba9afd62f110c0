//! Local process execution with captured output

use crate::command::Command;
use crate::error::{Error, Result};
use std::process::Stdio;
use tracing::debug;

/// Process exit status
#[derive(Debug, Clone)]
pub struct ExitStatus {
    /// Exit code if the process exited normally
    pub code: Option<i32>,
}

impl ExitStatus {
    /// Returns true if the process exited successfully (code 0)
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Completed process: exit status plus captured output
#[derive(Debug, Clone)]
pub struct ExitResult {
    /// How the process exited
    pub status: ExitStatus,
    /// Captured stdout, lossily decoded as UTF-8
    pub stdout: String,
    /// Captured stderr, lossily decoded as UTF-8
    pub stderr: String,
}

impl ExitResult {
    /// Returns true if the process exited successfully (code 0)
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// The trailing-whitespace-trimmed stderr, for error messages
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim_end()
    }
}

/// Runner for executing commands as local child processes
///
/// The name is used for logging and identification only.
#[derive(Debug, Clone)]
pub struct LocalRunner {
    name: String,
}

impl LocalRunner {
    /// Create a new runner with the given identification name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Get the runner name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute a command to completion, capturing stdout and stderr
    pub async fn run(&self, command: &Command) -> Result<ExitResult> {
        debug!(runner = %self.name, command = %command.display_line(), "executing command");

        let mut async_cmd = command.prepare();
        async_cmd.stdout(Stdio::piped());
        async_cmd.stderr(Stdio::piped());
        async_cmd.stdin(Stdio::null());

        let output = async_cmd.output().await.map_err(|e| {
            Error::spawn_failed(format!(
                "failed to run '{}': {}",
                command.get_program().to_string_lossy(),
                e
            ))
        })?;

        let result = ExitResult {
            status: ExitStatus {
                code: output.status.code(),
            },
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            runner = %self.name,
            code = ?result.status.code,
            "command completed"
        );

        Ok(result)
    }
}
