// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gx - run command-line tools through the gx process layer

mod commands;
mod env;
mod exit_error;
mod logging;

use clap::{CommandFactory, Parser, Subcommand};

use crate::commands::{exists, run};
use crate::exit_error::ExitError;

#[derive(Parser, Debug)]
#[command(name = "gx", version, about = "Run command-line tools and relay their output")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a command and relay its output and exit code
    Run(run::RunArgs),
    /// Check whether a command resolves
    Exists(exists::ExistsArgs),
}

#[tokio::main]
async fn main() {
    logging::init();
    let code = match dispatch(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                eprintln!("gx: {}", exit.message);
                exit.code
            }
            None => {
                eprintln!("gx: {:#}", e);
                1
            }
        },
    };
    std::process::exit(code);
}

async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Some(Commands::Run(args)) => run::handle(args).await,
        Some(Commands::Exists(args)) => Ok(exists::handle(args)),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(0)
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
