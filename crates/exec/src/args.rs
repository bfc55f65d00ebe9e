// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Argument strings passed to an executable.
//!
//! The rendered form (`Display`) is the argument signature: the fake
//! executable matches staged expectations against it byte-for-byte, so the
//! rendering must stay deterministic.

use std::fmt;

/// Ordered arguments for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ArgumentString {
    args: Vec<String>,
}

impl ArgumentString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument.
    pub fn add(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append an argument only when `condition` holds.
    pub fn add_if(self, condition: bool, arg: impl Into<String>) -> Self {
        if condition {
            self.add(arg)
        } else {
            self
        }
    }

    pub fn push(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(String::as_str)
    }

    /// Render `command` followed by these arguments as a POSIX shell line.
    pub fn shell_line(&self, command: &str) -> String {
        let mut line = shell_quote(command);
        for arg in &self.args {
            line.push(' ');
            line.push_str(&shell_quote(arg));
        }
        line
    }
}

impl fmt::Display for ArgumentString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if needs_quotes(arg) {
                write!(f, "\"{}\"", arg.replace('"', "\\\""))?;
            } else {
                f.write_str(arg)?;
            }
        }
        Ok(())
    }
}

fn needs_quotes(arg: &str) -> bool {
    arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"')
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg.chars().all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

impl<S: Into<String>> FromIterator<S> for ArgumentString {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { args: iter.into_iter().map(Into::into).collect() }
    }
}

impl<S: Into<String>> Extend<S> for ArgumentString {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.args.extend(iter.into_iter().map(Into::into));
    }
}

impl From<Vec<String>> for ArgumentString {
    fn from(args: Vec<String>) -> Self {
        Self { args }
    }
}

impl<const N: usize> From<[&str; N]> for ArgumentString {
    fn from(args: [&str; N]) -> Self {
        args.into_iter().collect()
    }
}

impl From<&[&str]> for ArgumentString {
    fn from(args: &[&str]) -> Self {
        args.iter().copied().collect()
    }
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
