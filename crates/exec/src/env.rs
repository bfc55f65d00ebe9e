// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the exec crate.

use std::time::Duration;

/// How long to keep draining standard error after the process exits
/// (default 500ms, configurable via `GX_STDERR_DRAIN_MS`).
///
/// A descendant that inherited the pipe can hold it open past the exit of
/// the process itself; the exit is published once this elapses.
pub fn stderr_drain_timeout() -> Duration {
    std::env::var("GX_STDERR_DRAIN_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(500))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
