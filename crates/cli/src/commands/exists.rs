// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gx exists` - check whether a command resolves on this machine

use std::path::PathBuf;

use clap::Args;
use gx_exec::ExecutableDescriptor;

#[derive(Args, Debug)]
pub struct ExistsArgs {
    /// Directory relative commands are resolved against
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub cwd: PathBuf,
    /// Command name or path
    pub command: String,
}

pub fn handle(args: ExistsArgs) -> i32 {
    let descriptor = ExecutableDescriptor::new(args.command, args.cwd);
    if descriptor.exists() {
        println!("{}: found", descriptor.command());
        0
    } else {
        println!("{}: not found", descriptor.command());
        1
    }
}
