// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process lifecycle state shared between a handle and whatever observes exit.
//!
//! ```text
//! Running ──exit──▶ Exited ──dispose──▶ Disposed
//!    │                                      ▲
//!    └──────────────dispose─────────────────┘
//! ```
//!
//! Blocking waiters park on a condvar; async waiters follow a watch channel
//! whose value is bumped on every transition. The mutex-guarded record is the
//! single source of truth for both.

use parking_lot::{Condvar, Mutex};
use tokio::sync::watch;

use crate::ExecError;

/// Exit code reported for a process terminated by `kill`.
#[cfg(unix)]
pub const KILLED_EXIT_CODE: i32 = 128 + 9;
#[cfg(not(unix))]
pub const KILLED_EXIT_CODE: i32 = 1;

/// Exit code reported when the OS gave no code and no signal.
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// Observable lifecycle of a process handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Exited(i32),
    Disposed,
}

crate::simple_display! {
    ProcessState {
        Running => "running",
        Exited(..) => "exited",
        Disposed => "disposed",
    }
}

impl ProcessState {
    pub fn is_running(&self) -> bool {
        matches!(self, ProcessState::Running)
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessState::Exited(code) => Some(*code),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Record {
    exit_code: Option<i32>,
    fault: Option<String>,
    disposed: bool,
}

impl Record {
    fn settled(&self) -> bool {
        self.exit_code.is_some() || self.disposed
    }

    fn state(&self) -> ProcessState {
        match (self.disposed, self.exit_code) {
            (true, _) => ProcessState::Disposed,
            (false, Some(code)) => ProcessState::Exited(code),
            (false, None) => ProcessState::Running,
        }
    }
}

/// Shared lifecycle cell.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    record: Mutex<Record>,
    settled: Condvar,
    generation: watch::Sender<u64>,
}

impl Lifecycle {
    pub(crate) fn running() -> Self {
        Self::with_record(Record::default())
    }

    pub(crate) fn exited(code: i32) -> Self {
        Self::with_record(Record { exit_code: Some(code), ..Record::default() })
    }

    fn with_record(record: Record) -> Self {
        let (generation, _) = watch::channel(0);
        Self { record: Mutex::new(record), settled: Condvar::new(), generation }
    }

    pub(crate) fn state(&self) -> ProcessState {
        self.record.lock().state()
    }

    /// Record a natural (or kill-induced) exit. Returns false if the exit
    /// code was already known or the handle was disposed first.
    pub(crate) fn exit(&self, code: i32) -> bool {
        self.transition(|record| {
            if record.settled() {
                return false;
            }
            record.exit_code = Some(code);
            true
        })
    }

    /// Record that the exit code could not be obtained.
    pub(crate) fn fault(&self, message: impl Into<String>) -> bool {
        let message = message.into();
        self.transition(move |record| {
            if record.settled() {
                return false;
            }
            record.exit_code = Some(UNKNOWN_EXIT_CODE);
            record.fault = Some(message);
            true
        })
    }

    /// Mark the handle released. Returns false if already disposed.
    pub(crate) fn dispose(&self) -> bool {
        self.transition(|record| !std::mem::replace(&mut record.disposed, true))
    }

    fn transition(&self, apply: impl FnOnce(&mut Record) -> bool) -> bool {
        let changed = {
            let mut record = self.record.lock();
            let changed = apply(&mut record);
            if changed {
                self.settled.notify_all();
            }
            changed
        };
        if changed {
            self.generation.send_modify(|g| *g += 1);
        }
        changed
    }

    /// Block the calling thread until exit or disposal.
    ///
    /// `Ok(None)` means the handle was disposed before the exit was known.
    pub(crate) fn wait_blocking(&self) -> Result<Option<i32>, ExecError> {
        let mut record = self.record.lock();
        while !record.settled() {
            self.settled.wait(&mut record);
        }
        Self::outcome(&record).map(Some).or_else(|e| match e {
            ExecError::Disposed => Ok(None),
            other => Err(other),
        })
    }

    /// Resolve once exit or disposal is observed.
    pub(crate) async fn wait(&self) -> Result<i32, ExecError> {
        let mut rx = self.generation.subscribe();
        loop {
            {
                let record = self.record.lock();
                if record.settled() {
                    return Self::outcome(&record);
                }
            }
            if rx.changed().await.is_err() {
                return Err(ExecError::Disposed);
            }
        }
    }

    fn outcome(record: &Record) -> Result<i32, ExecError> {
        if let Some(fault) = &record.fault {
            return Err(ExecError::WaitFailed(fault.clone()));
        }
        record.exit_code.ok_or(ExecError::Disposed)
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
