// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run-to-completion helper on top of [`Executable::start`].
//!
//! This is where `throw_on_error_exit` takes effect: a non-zero exit becomes
//! [`ExecError::ExitedWithError`] carrying the captured error text.

use std::io;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::{
    ArgumentString, ExecError, Executable, InputStream, OutputStream, ProcessHandle,
    StartOptions, StreamKind,
};

/// Collected result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub output: String,
    pub error: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Start a process, feed it `input`, drain its output, and wait for exit.
///
/// Output is always redirected; input is redirected only when given and is
/// closed after writing. Input is written while output is read, so a child
/// that echoes its input cannot stall on a full pipe. `options.cancellation`
/// bounds the whole call, output drain included; the process is not killed.
pub async fn execute(
    executable: &dyn Executable,
    arguments: &ArgumentString,
    options: StartOptions,
    input: Option<&[u8]>,
) -> Result<ExecutionResult, ExecError> {
    let options = options.redirect_output(true).redirect_input(input.is_some());
    let encoding = options.output_encoding;
    let throw_on_error_exit = options.throw_on_error_exit;
    let cancellation = options.cancellation.clone();

    let mut process = executable.start(arguments, options)?;
    let feed = match input {
        Some(input) => Some((process.take_stdin()?, input)),
        None => None,
    };
    let stdout = process.take_stdout()?;

    let run = run_to_exit(&*process, feed, stdout);
    let (raw, exit_code) = match &cancellation {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => return Err(ExecError::Canceled),
            result = run => result?,
        },
        None => run.await?,
    };
    let output = encoding.decode(&raw, StreamKind::Output)?;
    let error = process.error_text()?;

    let command = executable.descriptor().display_line(arguments);
    tracing::debug!(%command, exit_code, "execution finished");

    if throw_on_error_exit && exit_code != 0 {
        return Err(ExecError::ExitedWithError { command, exit_code, stderr: error });
    }

    Ok(ExecutionResult { exit_code, output, error })
}

/// Write input and read output concurrently, then wait for the exit code.
async fn run_to_exit(
    process: &dyn ProcessHandle,
    feed: Option<(Box<InputStream>, &[u8])>,
    mut stdout: Box<OutputStream>,
) -> Result<(Vec<u8>, i32), ExecError> {
    let write = async move {
        let Some((mut stdin, input)) = feed else {
            return Ok(());
        };
        let written = async {
            stdin.write_all(input).await?;
            stdin.shutdown().await
        }
        .await;
        match written {
            // The child stopped reading; what it did print is still wanted.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!("process closed its input before all of it was written");
                Ok(())
            }
            other => other,
        }
    };
    let read = async {
        let mut raw = Vec::new();
        stdout.read_to_end(&mut raw).await?;
        Ok::<_, io::Error>(raw)
    };

    let ((), raw) = tokio::try_join!(write, read)?;
    let exit_code = process.wait_for_exit_async().await?;
    Ok((raw, exit_code))
}

#[cfg(test)]
#[path = "execute_tests.rs"]
mod tests;
