// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process handles and the executables that start them.
//!
//! Callers hold an `Executable` and never branch on whether it spawns real
//! processes ([`crate::SystemExecutable`]) or serves staged results
//! (`FakeExecutable`, behind the `test-support` feature).

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;

use crate::{ArgumentString, ExecError, ExecutableDescriptor, ProcessState, StartOptions};

/// Writable standard input of a process.
pub type InputStream = dyn AsyncWrite + Send + Unpin;

/// Readable standard output of a process.
pub type OutputStream = dyn AsyncRead + Send + Unpin;

/// One started (or simulated) child process.
///
/// Dropping a handle disposes it. Disposal releases the streams but does not
/// terminate the process; only [`ProcessHandle::kill`] does that.
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    /// OS process id, if there is a live OS process behind this handle.
    fn id(&self) -> Option<u32>;

    fn state(&self) -> ProcessState;

    /// Standard input. Fails with `NotRedirected` unless input redirection
    /// was requested at start.
    fn stdin(&mut self) -> Result<&mut InputStream, ExecError>;

    /// Close standard input so the process sees end-of-file.
    fn close_stdin(&mut self);

    /// Take ownership of standard input, so it can be written while output
    /// is read. Later `stdin` calls report the stream closed.
    fn take_stdin(&mut self) -> Result<Box<InputStream>, ExecError>;

    /// Standard output. Fails with `NotRedirected` unless output redirection
    /// was requested at start.
    fn stdout(&mut self) -> Result<&mut OutputStream, ExecError>;

    /// Take ownership of standard output. Later `stdout` calls report the
    /// stream closed.
    fn take_stdout(&mut self) -> Result<Box<OutputStream>, ExecError>;

    /// Captured standard error, decoded with the start encoding.
    ///
    /// Complete once the process has exited; partial while it runs.
    fn error_text(&self) -> Result<String, ExecError>;

    /// Forcibly terminate the process, and its descendants when
    /// `entire_process_tree` is set. A no-op once the process has exited.
    fn kill(&self, entire_process_tree: bool) -> Result<(), ExecError>;

    /// Block until the process exits or the handle is disposed.
    ///
    /// Returns `Ok(None)` if disposal came first. Must not be called from a
    /// thread that drives the runtime the process was started on.
    fn wait_for_exit(&self) -> Result<Option<i32>, ExecError>;

    /// Resolve to the exit code, or `Err(Disposed)` if disposal came first.
    async fn wait_for_exit_async(&self) -> Result<i32, ExecError>;

    /// Like [`ProcessHandle::wait_for_exit_async`], but gives up with
    /// `Err(Canceled)` when `token` fires. The process keeps running.
    async fn wait_for_exit_cancellable(&self, token: &CancellationToken) -> Result<i32, ExecError> {
        tokio::select! {
            biased;
            result = self.wait_for_exit_async() => result,
            _ = token.cancelled() => Err(ExecError::Canceled),
        }
    }

    /// Wait until the process is ready for input. Only meaningful for
    /// processes with a message loop; a no-op everywhere else.
    fn wait_for_input_idle(&self) -> Result<(), ExecError>;

    /// Release streams and OS resources. Idempotent.
    fn dispose(&mut self);
}

/// Starts processes from an [`ExecutableDescriptor`].
pub trait Executable: Send + Sync {
    fn descriptor(&self) -> &ExecutableDescriptor;

    /// Start the descriptor's command with `arguments` appended to its
    /// prefix arguments.
    fn start(
        &self,
        arguments: &ArgumentString,
        options: StartOptions,
    ) -> Result<Box<dyn ProcessHandle>, ExecError>;

    fn exists(&self) -> bool {
        self.descriptor().exists()
    }
}
