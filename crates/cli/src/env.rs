// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

/// Log filter directive: `GX_LOG` > "warn"
pub fn log_filter() -> String {
    std::env::var("GX_LOG").ok().filter(|s| !s.trim().is_empty()).unwrap_or_else(|| "warn".to_string())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
