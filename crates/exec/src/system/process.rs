// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handle to a live OS process and the task that reaps it.

use std::process::ExitStatus;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::lifecycle::{Lifecycle, UNKNOWN_EXIT_CODE};
use crate::{
    ExecError, InputStream, OutputEncoding, OutputStream, ProcessHandle, ProcessState,
    StartOptions, StreamKind,
};

/// A spawned child process.
///
/// The `Child` itself is owned by a reaper task; this handle talks to it
/// through the shared lifecycle cell and a kill-request channel.
pub struct SystemProcess {
    pid: Option<u32>,
    command: String,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    redirect_input: bool,
    redirect_output: bool,
    encoding: OutputEncoding,
    stderr: Arc<Mutex<Vec<u8>>>,
    lifecycle: Arc<Lifecycle>,
    kill_tx: mpsc::UnboundedSender<bool>,
}

impl SystemProcess {
    pub(super) fn attach(
        mut child: Child,
        runtime: &Handle,
        command: String,
        options: &StartOptions,
    ) -> Self {
        let stderr = Arc::new(Mutex::new(Vec::new()));
        let collector =
            child.stderr.take().map(|pipe| runtime.spawn(collect_stderr(pipe, Arc::clone(&stderr))));
        let lifecycle = Arc::new(Lifecycle::running());
        let (kill_tx, kill_rx) = mpsc::unbounded_channel();

        let process = Self {
            pid: child.id(),
            command: command.clone(),
            stdin: child.stdin.take(),
            stdout: child.stdout.take(),
            redirect_input: options.redirect_input,
            redirect_output: options.redirect_output,
            encoding: options.output_encoding,
            stderr,
            lifecycle: Arc::clone(&lifecycle),
            kill_tx,
        };
        runtime.spawn(reap(child, collector, lifecycle, kill_rx, command));
        process
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

async fn collect_stderr(mut pipe: ChildStderr, buffer: Arc<Mutex<Vec<u8>>>) {
    let mut chunk = [0u8; 4096];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buffer.lock().extend_from_slice(&chunk[..n]),
            Err(e) => {
                tracing::debug!(error = %e, "stderr read failed");
                break;
            }
        }
    }
}

/// Wait for the child, serving kill requests meanwhile, then publish the exit.
async fn reap(
    mut child: Child,
    collector: Option<JoinHandle<()>>,
    lifecycle: Arc<Lifecycle>,
    mut kill_rx: mpsc::UnboundedReceiver<bool>,
    command: String,
) {
    let status = loop {
        tokio::select! {
            status = child.wait() => break status,
            Some(entire_process_tree) = kill_rx.recv() => {
                tracing::debug!(%command, entire_process_tree, "killing process");
                if let Err(e) = super::kill::terminate(&mut child, entire_process_tree) {
                    tracing::warn!(%command, error = %e, "failed to kill process");
                }
            }
        }
    };

    if let Some(mut collector) = collector {
        let drain = crate::env::stderr_drain_timeout();
        if tokio::time::timeout(drain, &mut collector).await.is_err() {
            tracing::debug!(%command, "stderr still open after exit, abandoning drain");
            collector.abort();
        }
    }

    match status {
        Ok(status) => {
            let code = exit_code(status);
            tracing::debug!(%command, exit_code = code, "process exited");
            lifecycle.exit(code);
        }
        Err(e) => {
            tracing::warn!(%command, error = %e, "failed waiting for process");
            lifecycle.fault(e.to_string());
        }
    }
}

/// Exit code of a finished process; signal deaths map to `128 + signal`.
pub(super) fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    UNKNOWN_EXIT_CODE
}

#[async_trait]
impl ProcessHandle for SystemProcess {
    fn id(&self) -> Option<u32> {
        self.pid
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
        let bytes = self.stderr.lock();
        self.encoding.decode(&bytes, StreamKind::Error)
    }

    fn kill(&self, entire_process_tree: bool) -> Result<(), ExecError> {
        if !self.lifecycle.state().is_running() {
            return Ok(());
        }
        // A closed channel means the reaper already saw the exit.
        let _ = self.kill_tx.send(entire_process_tree);
        Ok(())
    }

    fn wait_for_exit(&self) -> Result<Option<i32>, ExecError> {
        self.lifecycle.wait_blocking()
    }

    async fn wait_for_exit_async(&self) -> Result<i32, ExecError> {
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
        if self.lifecycle.dispose() {
            tracing::trace!(command = %self.command, "process handle disposed");
        }
    }
}

impl Drop for SystemProcess {
    fn drop(&mut self) {
        self.dispose();
    }
}
