// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation start options and output decoding.

use std::str::FromStr;

use tokio_util::sync::CancellationToken;

use crate::{ExecError, StreamKind};

/// Character encoding used to decode a process's output and error text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputEncoding {
    /// UTF-8; invalid sequences are an error.
    Utf8,
    /// UTF-8; invalid sequences become U+FFFD.
    #[default]
    Utf8Lossy,
    /// ISO-8859-1; every byte maps to the code point of the same value.
    Latin1,
}

crate::simple_display! {
    OutputEncoding {
        Utf8 => "utf8",
        Utf8Lossy => "utf8-lossy",
        Latin1 => "latin1",
    }
}

impl OutputEncoding {
    pub fn decode(&self, bytes: &[u8], stream: StreamKind) -> Result<String, ExecError> {
        match self {
            OutputEncoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|_| ExecError::Decode { stream, encoding: *self }),
            OutputEncoding::Utf8Lossy => Ok(String::from_utf8_lossy(bytes).into_owned()),
            OutputEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

impl FromStr for OutputEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(OutputEncoding::Utf8),
            "utf8-lossy" | "utf-8-lossy" => Ok(OutputEncoding::Utf8Lossy),
            "latin1" | "iso-8859-1" => Ok(OutputEncoding::Latin1),
            other => Err(format!("unknown encoding '{}'", other)),
        }
    }
}

/// Options for one `Executable::start` call.
#[derive(Debug, Clone)]
pub struct StartOptions {
    /// Show a console window (Windows only).
    pub create_window: bool,
    /// Pipe standard input so the caller can write to it.
    pub redirect_input: bool,
    /// Pipe standard output and capture standard error.
    pub redirect_output: bool,
    pub output_encoding: OutputEncoding,
    /// Launch through the platform shell instead of directly.
    pub use_shell_execute: bool,
    /// Escalate a non-zero exit code as an error in [`crate::execute`].
    pub throw_on_error_exit: bool,
    /// If canceled before start, nothing is spawned.
    pub cancellation: Option<CancellationToken>,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            create_window: false,
            redirect_input: false,
            redirect_output: true,
            output_encoding: OutputEncoding::default(),
            use_shell_execute: false,
            throw_on_error_exit: true,
            cancellation: None,
        }
    }
}

impl StartOptions {
    pub fn new() -> Self {
        Self::default()
    }

    crate::setters! {
        set {
            create_window: bool,
            redirect_input: bool,
            redirect_output: bool,
            output_encoding: OutputEncoding,
            use_shell_execute: bool,
            throw_on_error_exit: bool,
        }
        option {
            cancellation: CancellationToken,
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Reject option combinations no platform can honor.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.use_shell_execute && (self.redirect_input || self.redirect_output) {
            return Err(ExecError::InvalidOperation(
                "shell execute cannot be combined with stream redirection".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
