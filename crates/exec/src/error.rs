// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for process execution.

use thiserror::Error;

/// A standard stream of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Input,
    Output,
    Error,
}

crate::simple_display! {
    StreamKind {
        Input => "standard input",
        Output => "standard output",
        Error => "standard error",
    }
}

/// Errors from starting, driving, or waiting on a process.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The OS refused to start the command.
    #[error("failed to spawn `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O on a running process's streams failed.
    #[error("process I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Reaping the process failed; its exit code is unknown.
    #[error("failed waiting for process exit: {0}")]
    WaitFailed(String),

    /// A stream was accessed that was not redirected at start.
    #[error("{stream} was not redirected when the process was started")]
    NotRedirected { stream: StreamKind },

    /// A redirected stream was already closed or released.
    #[error("{stream} has been closed")]
    StreamClosed { stream: StreamKind },

    /// Contradictory start options or a call outside its valid context.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The start or the wait was canceled.
    #[error("operation was canceled")]
    Canceled,

    /// The handle was disposed before the process exited.
    #[error("process handle was disposed before the process exited")]
    Disposed,

    /// The process exited with a non-zero code and escalation was requested.
    #[error("`{command}` exited with code {exit_code}: {stderr}")]
    ExitedWithError {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// Output bytes could not be decoded with the requested encoding.
    #[error("{stream} is not valid {encoding}")]
    Decode {
        stream: StreamKind,
        encoding: crate::OutputEncoding,
    },

    /// The test harness was asked to start a signature nothing was staged for.
    #[error("unexpected arguments: {arguments}")]
    UnexpectedArguments { arguments: String },
}

impl ExecError {
    /// True for the two outcomes that mean "stopped waiting", not "failed".
    pub fn is_canceled(&self) -> bool {
        matches!(self, ExecError::Canceled | ExecError::Disposed)
    }
}
