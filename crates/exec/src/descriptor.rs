// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executable descriptors: how to invoke a command.

use std::path::{Path, PathBuf};

use crate::ArgumentString;

/// Immutable recipe for launching a command.
///
/// Any number of processes may be started from one descriptor. The prefix
/// arguments are placed before the caller's arguments on every invocation
/// (e.g. `-c core.quotepath=false` for git).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableDescriptor {
    command: String,
    working_dir: PathBuf,
    prefix_arguments: Vec<String>,
}

impl ExecutableDescriptor {
    pub fn new(command: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self { command: command.into(), working_dir: working_dir.into(), prefix_arguments: Vec::new() }
    }

    pub fn with_prefix_arguments<I, S>(mut self, prefix: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix_arguments = prefix.into_iter().map(Into::into).collect();
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn prefix_arguments(&self) -> &[String] {
        &self.prefix_arguments
    }

    /// Full argument vector for an invocation: prefix, then `arguments`.
    pub fn argv(&self, arguments: &ArgumentString) -> ArgumentString {
        let mut argv: ArgumentString = self.prefix_arguments.iter().cloned().collect();
        argv.extend(arguments.iter());
        argv
    }

    /// Human-readable command line, used in logs and escalated errors.
    pub fn display_line(&self, arguments: &ArgumentString) -> String {
        let argv = self.argv(arguments);
        if argv.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, argv)
        }
    }

    /// Whether the command is an existing file or resolves on `PATH`.
    ///
    /// Relative paths containing a separator are resolved against the
    /// working directory.
    pub fn exists(&self) -> bool {
        let path = Path::new(&self.command);
        if path.components().count() > 1 {
            let resolved =
                if path.is_absolute() { path.to_path_buf() } else { self.working_dir.join(path) };
            return resolved.is_file();
        }
        which::which(&self.command).is_ok()
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
