// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory process handles served by the fake executable.

use std::io::{self, Cursor, Read};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use super::StagedOutput;
use crate::lifecycle::{Lifecycle, KILLED_EXIT_CODE};
use crate::{
    ExecError, InputStream, OutputStream, ProcessHandle, ProcessState, StartOptions, StreamKind,
};

/// Stream contents shared between a fake process and its executable, so
/// `verify` can inspect them after the handle is gone.
#[derive(Debug)]
pub(super) struct FakeStreams {
    arguments: String,
    output: Mutex<Cursor<Vec<u8>>>,
    input: Mutex<Vec<u8>>,
    expected_input: Vec<u8>,
}

impl FakeStreams {
    /// Append a description of every leftover or unexpected byte.
    pub(super) fn check(&self, problems: &mut Vec<String>) {
        let output = self.output.lock();
        let total = output.get_ref().len() as u64;
        if output.position() < total {
            problems.push(format!(
                "output of `{}` was not read to the end ({} of {} bytes read)",
                self.arguments,
                output.position(),
                total
            ));
        }

        let input = self.input.lock();
        if *input != self.expected_input {
            problems.push(format!(
                "unexpected input written to `{}`: {:?} (expected {:?})",
                self.arguments,
                String::from_utf8_lossy(&input),
                String::from_utf8_lossy(&self.expected_input)
            ));
        }
    }
}

/// Standard output of a fake process, pre-seeded with the staged text.
struct FakeOutput(Arc<FakeStreams>);

impl AsyncRead for FakeOutput {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut cursor = self.0.output.lock();
        let n = cursor.read(buf.initialize_unfilled())?;
        buf.advance(n);
        Poll::Ready(Ok(()))
    }
}

/// Standard input of a fake process; records everything written.
struct FakeInput(Arc<FakeStreams>);

impl AsyncWrite for FakeInput {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.0.input.lock().extend_from_slice(data);
        Poll::Ready(Ok(data.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Process handle for a staged invocation.
///
/// With a staged exit code the process is born exited. Without one it stays
/// running and every wait resolves as canceled, until `kill` ends it.
pub struct FakeProcess {
    streams: Arc<FakeStreams>,
    stdin: Option<FakeInput>,
    stdout: Option<FakeOutput>,
    redirect_input: bool,
    redirect_output: bool,
    error: String,
    lifecycle: Lifecycle,
}

impl FakeProcess {
    pub(super) fn new(staged: StagedOutput, options: &StartOptions) -> Self {
        let streams = Arc::new(FakeStreams {
            arguments: staged.arguments,
            output: Mutex::new(Cursor::new(staged.output.into_bytes())),
            input: Mutex::new(Vec::new()),
            expected_input: staged.expect_input.map(String::into_bytes).unwrap_or_default(),
        });
        let lifecycle = match staged.exit_code {
            Some(code) => Lifecycle::exited(code),
            None => Lifecycle::running(),
        };
        Self {
            stdin: Some(FakeInput(Arc::clone(&streams))),
            stdout: Some(FakeOutput(Arc::clone(&streams))),
            streams,
            redirect_input: options.redirect_input,
            redirect_output: options.redirect_output,
            error: staged.error.unwrap_or_default(),
            lifecycle,
        }
    }

    pub(super) fn streams(&self) -> Arc<FakeStreams> {
        Arc::clone(&self.streams)
    }

    pub fn arguments(&self) -> &str {
        &self.streams.arguments
    }
}

#[async_trait]
impl ProcessHandle for FakeProcess {
    fn id(&self) -> Option<u32> {
        None
    }

    fn state(&self) -> ProcessState {
        self.lifecycle.state()
    }

    fn stdin(&mut self) -> Result<&mut InputStream, ExecError> {
        if !self.redirect_input {
            return Err(ExecError::NotRedirected { stream: StreamKind::Input });
        }
        match self.stdin.as_mut() {
            Some(stdin) => Ok(stdin),
            None => Err(ExecError::StreamClosed { stream: StreamKind::Input }),
        }
    }

    fn close_stdin(&mut self) {
        self.stdin = None;
    }

    fn take_stdin(&mut self) -> Result<Box<InputStream>, ExecError> {
        if !self.redirect_input {
            return Err(ExecError::NotRedirected { stream: StreamKind::Input });
        }
        match self.stdin.take() {
            Some(stdin) => Ok(Box::new(stdin)),
            None => Err(ExecError::StreamClosed { stream: StreamKind::Input }),
        }
    }

    fn stdout(&mut self) -> Result<&mut OutputStream, ExecError> {
        if !self.redirect_output {
            return Err(ExecError::NotRedirected { stream: StreamKind::Output });
        }
        match self.stdout.as_mut() {
            Some(stdout) => Ok(stdout),
            None => Err(ExecError::StreamClosed { stream: StreamKind::Output }),
        }
    }

    fn take_stdout(&mut self) -> Result<Box<OutputStream>, ExecError> {
        if !self.redirect_output {
            return Err(ExecError::NotRedirected { stream: StreamKind::Output });
        }
        match self.stdout.take() {
            Some(stdout) => Ok(Box::new(stdout)),
            None => Err(ExecError::StreamClosed { stream: StreamKind::Output }),
        }
    }

    fn error_text(&self) -> Result<String, ExecError> {
        if !self.redirect_output {
            return Err(ExecError::NotRedirected { stream: StreamKind::Error });
        }
        Ok(self.error.clone())
    }

    fn kill(&self, _entire_process_tree: bool) -> Result<(), ExecError> {
        if self.lifecycle.state().is_running() {
            self.lifecycle.exit(KILLED_EXIT_CODE);
        }
        Ok(())
    }

    fn wait_for_exit(&self) -> Result<Option<i32>, ExecError> {
        if self.lifecycle.state().is_running() {
            return Err(ExecError::Canceled);
        }
        self.lifecycle.wait_blocking()
    }

    async fn wait_for_exit_async(&self) -> Result<i32, ExecError> {
        if self.lifecycle.state().is_running() {
            return Err(ExecError::Canceled);
        }
        self.lifecycle.wait().await
    }

    fn wait_for_input_idle(&self) -> Result<(), ExecError> {
        match self.lifecycle.state() {
            ProcessState::Disposed => Err(ExecError::Disposed),
            _ => Ok(()),
        }
    }

    fn dispose(&mut self) {
        self.stdin = None;
        self.stdout = None;
        self.lifecycle.dispose();
    }
}

impl Drop for FakeProcess {
    fn drop(&mut self) {
        self.dispose();
    }
}
