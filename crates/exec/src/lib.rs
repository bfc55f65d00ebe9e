// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! gx-exec: process execution for command-line tool front-ends
//!
//! An [`Executable`] starts a command described by an
//! [`ExecutableDescriptor`] and returns a [`ProcessHandle`] exposing the
//! child's streams and lifecycle. [`SystemExecutable`] spawns real
//! processes; `FakeExecutable` (feature `test-support`) serves staged
//! results so callers can be tested without touching the OS.

pub mod macros;

pub mod args;
pub mod descriptor;
pub mod env;
mod error;
pub mod execute;
mod lifecycle;
pub mod options;
pub mod process;
pub mod system;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::panic)]
pub mod fake;

pub use args::ArgumentString;
pub use descriptor::ExecutableDescriptor;
pub use error::{ExecError, StreamKind};
pub use execute::{execute, ExecutionResult};
pub use lifecycle::{ProcessState, KILLED_EXIT_CODE, UNKNOWN_EXIT_CODE};
pub use options::{OutputEncoding, StartOptions};
pub use process::{Executable, InputStream, OutputStream, ProcessHandle};
pub use system::{SystemExecutable, SystemProcess};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{
    CommandRegistration, FakeCall, FakeExecutable, FakeProcess, OutputRegistration, StagedOutput,
    VerifyError,
};
