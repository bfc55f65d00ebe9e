// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination. A child's
//! failing exit code is passed through unchanged.

use std::fmt;

use gx_exec::ExecError;

/// Exit code when the child could not be run at all (as in `sh`).
pub const NOT_RUNNABLE: i32 = 127;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// The child ran and failed; `gx` ends with the child's code.
    pub fn exited(command: &str, exit_code: i32) -> Self {
        Self::new(exit_code, format!("`{}` exited with code {}", command, exit_code))
    }

    /// Map an execution failure to the exit code `gx` should end with.
    pub fn from_exec(err: ExecError) -> Self {
        match err {
            ExecError::ExitedWithError { command, exit_code, .. } => {
                Self::exited(&command, exit_code)
            }
            err @ ExecError::SpawnFailed { .. } => Self::new(NOT_RUNNABLE, err.to_string()),
            err => Self::new(1, err.to_string()),
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
