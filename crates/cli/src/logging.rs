// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup. Logs go to stderr so stdout stays the child's.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_new(crate::env::log_filter()).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed (e.g. under test harnesses).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
