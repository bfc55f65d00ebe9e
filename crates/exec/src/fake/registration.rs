// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped registrations returned by the staging calls.
//!
//! Dropping a registration asserts that what it staged was consumed. The
//! assertion is skipped while the thread is already panicking so a failing
//! test reports its own failure rather than aborting.

use std::sync::Arc;

use super::{FakeState, StagedOutput};

/// Guard for a staged output entry.
#[must_use = "dropping the registration immediately asserts that it was consumed"]
pub struct OutputRegistration {
    state: Arc<FakeState>,
    id: u64,
    arguments: String,
    output: String,
    error: Option<String>,
}

impl OutputRegistration {
    pub(super) fn new(state: Arc<FakeState>, id: u64, staged: &StagedOutput) -> Self {
        Self {
            state,
            id,
            arguments: staged.arguments.clone(),
            output: staged.output.clone(),
            error: staged.error.clone(),
        }
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    /// Whether this entry is still waiting at the top of its stack.
    pub fn is_pending(&self) -> bool {
        self.state.output_on_top(&self.arguments, self.id)
    }
}

impl Drop for OutputRegistration {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        if self.is_pending() {
            panic!(
                "staged output should have been consumed\narguments: {}\noutput: {}\nerror: {}",
                self.arguments,
                self.output,
                self.error.as_deref().unwrap_or("")
            );
        }
    }
}

/// Guard for a staged command.
#[must_use = "dropping the registration immediately asserts that it was consumed"]
pub struct CommandRegistration {
    state: Arc<FakeState>,
    id: u64,
    arguments: String,
}

impl CommandRegistration {
    pub(super) fn new(state: Arc<FakeState>, id: u64, arguments: String) -> Self {
        Self { state, id, arguments }
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }
}

impl Drop for CommandRegistration {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        if self.state.command_superseded(&self.arguments, self.id) {
            panic!("staged command should have been consumed\narguments: {}", self.arguments);
        }
    }
}
