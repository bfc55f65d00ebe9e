// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gx run` - run a command once and relay its streams and exit code

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use gx_exec::{
    execute, ArgumentString, Executable, ExecutableDescriptor, OutputEncoding, StartOptions,
    SystemExecutable,
};

use crate::exit_error::ExitError;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Working directory for the command
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub cwd: PathBuf,
    /// Argument placed before ARGS on every invocation (repeatable)
    #[arg(long = "prefix", value_name = "ARG", allow_hyphen_values = true)]
    pub prefix: Vec<String>,
    /// Text written to the command's standard input
    #[arg(long, value_name = "TEXT", conflicts_with = "shell")]
    pub input: Option<String>,
    /// Encoding of the command's output (utf8, utf8-lossy, latin1)
    #[arg(long, value_name = "ENC", default_value = "utf8-lossy")]
    pub encoding: OutputEncoding,
    /// Report a non-zero exit through the exit code only
    #[arg(long)]
    pub no_fail: bool,
    /// Run through the platform shell with inherited streams
    #[arg(long)]
    pub shell: bool,
    /// Command to run
    pub command: String,
    /// Arguments for the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl RunArgs {
    fn executable(&self) -> SystemExecutable {
        let descriptor = ExecutableDescriptor::new(self.command.clone(), self.cwd.clone())
            .with_prefix_arguments(self.prefix.iter().cloned());
        SystemExecutable::new(descriptor)
    }

    fn arguments(&self) -> ArgumentString {
        self.args.iter().cloned().collect()
    }
}

/// Returns the exit code `gx` should end with.
pub async fn handle(args: RunArgs) -> Result<i32> {
    let executable = args.executable();
    let arguments = args.arguments();
    tracing::debug!(command = %executable.descriptor().display_line(&arguments), "gx run");

    if args.shell {
        return run_in_shell(&executable, &arguments).await;
    }

    // Escalation happens here, after both streams have been relayed.
    let options = StartOptions::new().output_encoding(args.encoding).throw_on_error_exit(false);
    let input = args.input.as_deref().map(str::as_bytes);

    let result = execute(&executable, &arguments, options, input)
        .await
        .map_err(ExitError::from_exec)?;
    relay(&result.output, &result.error)?;

    if !args.no_fail && !result.success() {
        let command = executable.descriptor().display_line(&arguments);
        return Err(ExitError::exited(&command, result.exit_code).into());
    }
    Ok(result.exit_code)
}

async fn run_in_shell(executable: &SystemExecutable, arguments: &ArgumentString) -> Result<i32> {
    let options = StartOptions::new().redirect_output(false).use_shell_execute(true);
    let mut process = executable.start(arguments, options).map_err(ExitError::from_exec)?;
    let code = process.wait_for_exit_async().await.map_err(ExitError::from_exec)?;
    process.dispose();
    Ok(code)
}

fn relay(output: &str, error: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    let mut stderr = std::io::stderr().lock();
    stderr.write_all(error.as_bytes())?;
    stderr.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
