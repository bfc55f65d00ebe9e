// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic stand-in for [`crate::SystemExecutable`].
//!
//! Tests stage what the next invocation with a given argument signature must
//! produce; `start` serves it without spawning anything. Every staged entry
//! must be consumed and every served output read to the end, which
//! [`FakeExecutable::verify`] and the registration guards assert.
//!
//! ```ignore
//! let git = FakeExecutable::new();
//! let _staged = git.stage_output("version", "tool version 2.40");
//! let result = execute(&git, &["version"].into(), StartOptions::new(), None).await?;
//! git.verify();
//! ```

mod process;
mod registration;

pub use process::FakeProcess;
pub use registration::{CommandRegistration, OutputRegistration};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::{
    ArgumentString, ExecError, Executable, ExecutableDescriptor, ProcessHandle, StartOptions,
};
use process::FakeStreams;

/// What one staged invocation produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedOutput {
    arguments: String,
    output: String,
    /// `None` models a process that never yields an exit code.
    exit_code: Option<i32>,
    error: Option<String>,
    /// Exactly what the code under test must write to standard input.
    expect_input: Option<String>,
}

impl StagedOutput {
    pub fn new(arguments: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            arguments: arguments.into(),
            output: output.into(),
            exit_code: Some(0),
            error: None,
            expect_input: None,
        }
    }

    crate::setters! {
        set {
            exit_code: Option<i32>,
        }
        option {
            error: String,
            expect_input: String,
        }
    }
}

/// Recorded `start` call
#[derive(Debug, Clone)]
pub struct FakeCall {
    pub arguments: String,
    pub options: StartOptions,
}

/// Problems found by [`FakeExecutable::check`].
#[derive(Debug, Error)]
#[error("fake executable verification failed:\n{}", .problems.join("\n"))]
pub struct VerifyError {
    pub problems: Vec<String>,
}

#[derive(Debug)]
struct StagedEntry {
    id: u64,
    staged: StagedOutput,
}

type OutputStack = Arc<Mutex<Vec<StagedEntry>>>;

#[derive(Default)]
struct FakeState {
    /// Per-signature LIFO stacks. Only non-empty stacks are kept.
    outputs: RwLock<HashMap<String, OutputStack>>,
    commands: Mutex<HashMap<String, u64>>,
    next_id: AtomicU64,
    processes: Mutex<Vec<Arc<FakeStreams>>>,
    unexpected: Mutex<Vec<String>>,
    calls: Mutex<Vec<FakeCall>>,
}

impl FakeState {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn push_output(&self, entry: StagedEntry) {
        // Pushing under the read lock keeps a push from landing on a stack
        // that `pop_output` is removing.
        if let Some(stack) = self.outputs.read().get(&entry.staged.arguments) {
            stack.lock().push(entry);
            return;
        }
        self.outputs.write().entry(entry.staged.arguments.clone()).or_default().lock().push(entry);
    }

    /// Pop the newest entry; a stack left empty is dropped from the table.
    fn pop_output(&self, signature: &str) -> Option<StagedEntry> {
        let mut outputs = self.outputs.write();
        let (popped, emptied) = {
            let mut entries = outputs.get(signature)?.lock();
            let popped = entries.pop();
            (popped, entries.is_empty())
        };
        if emptied {
            outputs.remove(signature);
        }
        popped
    }

    fn output_on_top(&self, signature: &str, id: u64) -> bool {
        self.outputs
            .read()
            .get(signature)
            .is_some_and(|stack| stack.lock().last().is_some_and(|entry| entry.id == id))
    }

    fn take_command(&self, signature: &str) -> bool {
        self.commands.lock().remove(signature).is_some()
    }

    fn command_superseded(&self, signature: &str, id: u64) -> bool {
        self.commands.lock().get(signature).is_some_and(|stored| *stored != id)
    }
}

/// Fake executable for testing code that starts processes.
///
/// Clones share staging tables, so a clone can be handed to the code under
/// test while the test keeps one for staging and verification.
#[derive(Clone)]
pub struct FakeExecutable {
    descriptor: ExecutableDescriptor,
    inner: Arc<FakeState>,
}

impl Default for FakeExecutable {
    fn default() -> Self {
        Self::with_descriptor(ExecutableDescriptor::new("mock-git", "."))
    }
}

impl FakeExecutable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_descriptor(descriptor: ExecutableDescriptor) -> Self {
        Self { descriptor, inner: Arc::new(FakeState::default()) }
    }

    /// Stage `output` with exit code 0 for the next start of `arguments`.
    pub fn stage_output(
        &self,
        arguments: impl Into<String>,
        output: impl Into<String>,
    ) -> OutputRegistration {
        self.stage(StagedOutput::new(arguments, output))
    }

    /// Push a staged result; the most recently staged entry is served first.
    pub fn stage(&self, staged: StagedOutput) -> OutputRegistration {
        let id = self.inner.next_id();
        let registration = OutputRegistration::new(Arc::clone(&self.inner), id, &staged);
        self.inner.push_output(StagedEntry { id, staged });
        registration
    }

    /// Expect `arguments` to be started, with an empty successful result.
    ///
    /// Re-staging the same signature replaces the earlier registration.
    pub fn stage_command(&self, arguments: impl Into<String>) -> CommandRegistration {
        let arguments = arguments.into();
        let id = self.inner.next_id();
        self.inner.commands.lock().insert(arguments.clone(), id);
        CommandRegistration::new(Arc::clone(&self.inner), id, arguments)
    }

    /// Every `start` call so far, in order.
    pub fn calls(&self) -> Vec<FakeCall> {
        self.inner.calls.lock().clone()
    }

    /// Collect every unconsumed expectation, unread output, unexpected
    /// input, and unstaged invocation.
    pub fn check(&self) -> Result<(), VerifyError> {
        let mut problems = Vec::new();

        for (signature, stack) in self.inner.outputs.read().iter() {
            for entry in stack.lock().iter() {
                problems.push(format!(
                    "staged output was not consumed: `{}` (output: {:?})",
                    signature, entry.staged.output
                ));
            }
        }
        for signature in self.inner.commands.lock().keys() {
            problems.push(format!("staged command was not consumed: `{}`", signature));
        }
        problems.sort();

        for signature in self.inner.unexpected.lock().iter() {
            problems.push(format!("unexpected arguments: `{}`", signature));
        }
        for streams in self.inner.processes.lock().iter() {
            streams.check(&mut problems);
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(VerifyError { problems })
        }
    }

    /// Panic unless [`FakeExecutable::check`] passes.
    pub fn verify(&self) {
        if let Err(e) = self.check() {
            panic!("{}", e);
        }
    }
}

impl Executable for FakeExecutable {
    fn descriptor(&self) -> &ExecutableDescriptor {
        &self.descriptor
    }

    fn start(
        &self,
        arguments: &ArgumentString,
        options: StartOptions,
    ) -> Result<Box<dyn ProcessHandle>, ExecError> {
        let signature = arguments.to_string();
        tracing::debug!(arguments = %signature, "{} {}", self.descriptor.command(), signature);
        self.inner.calls.lock().push(FakeCall { arguments: signature.clone(), options: options.clone() });

        if options.is_canceled() {
            return Err(ExecError::Canceled);
        }
        options.validate()?;

        let staged = match self.inner.pop_output(&signature) {
            Some(entry) => Some(entry.staged),
            None if self.inner.take_command(&signature) => Some(StagedOutput::new(signature.clone(), "")),
            None => None,
        };

        match staged {
            Some(staged) => {
                let process = FakeProcess::new(staged, &options);
                self.inner.processes.lock().push(process.streams());
                Ok(Box::new(process))
            }
            None => {
                tracing::error!(arguments = %signature, "start with unstaged arguments");
                self.inner.unexpected.lock().push(signature.clone());
                Err(ExecError::UnexpectedArguments { arguments: signature })
            }
        }
    }

    fn exists(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
