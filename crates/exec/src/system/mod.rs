// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executable backed by real OS processes.

mod kill;
mod process;

pub use process::SystemProcess;

use std::process::Stdio;

use tokio::process::Command;
use tokio::runtime::Handle;

use crate::{
    ArgumentString, ExecError, Executable, ExecutableDescriptor, ProcessHandle, StartOptions,
};

/// Spawns the descriptor's command with `tokio::process`.
///
/// The reaper for each process runs on a tokio runtime: the one current at
/// `start` by default, or the one given to [`SystemExecutable::with_runtime`]
/// so that processes can be started from plain threads.
#[derive(Debug, Clone)]
pub struct SystemExecutable {
    descriptor: ExecutableDescriptor,
    runtime: Option<Handle>,
}

impl SystemExecutable {
    pub fn new(descriptor: ExecutableDescriptor) -> Self {
        Self { descriptor, runtime: None }
    }

    pub fn with_runtime(descriptor: ExecutableDescriptor, runtime: Handle) -> Self {
        Self { descriptor, runtime: Some(runtime) }
    }

    fn runtime(&self) -> Result<Handle, ExecError> {
        match &self.runtime {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current().map_err(|_| {
                ExecError::InvalidOperation(
                    "starting a process requires a tokio runtime".to_string(),
                )
            }),
        }
    }

    fn command(&self, arguments: &ArgumentString, options: &StartOptions) -> Command {
        let argv = self.descriptor.argv(arguments);
        let mut cmd = if options.use_shell_execute {
            shell_command(&self.descriptor, &argv)
        } else {
            let mut cmd = Command::new(self.descriptor.command());
            cmd.args(argv.iter());
            cmd
        };

        cmd.current_dir(self.descriptor.working_dir());
        cmd.stdin(if options.redirect_input { Stdio::piped() } else { Stdio::inherit() });
        if options.redirect_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }
        cmd.kill_on_drop(false);

        // Own process group, so a tree kill can signal every descendant.
        #[cfg(unix)]
        cmd.process_group(0);

        #[cfg(windows)]
        if !options.create_window {
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }
}

#[cfg(unix)]
fn shell_command(descriptor: &ExecutableDescriptor, argv: &ArgumentString) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(argv.shell_line(descriptor.command()));
    cmd
}

#[cfg(not(unix))]
fn shell_command(descriptor: &ExecutableDescriptor, argv: &ArgumentString) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(format!("{} {}", descriptor.command(), argv));
    cmd
}

impl Executable for SystemExecutable {
    fn descriptor(&self) -> &ExecutableDescriptor {
        &self.descriptor
    }

    fn start(
        &self,
        arguments: &ArgumentString,
        options: StartOptions,
    ) -> Result<Box<dyn ProcessHandle>, ExecError> {
        let line = self.descriptor.display_line(arguments);
        if options.is_canceled() {
            tracing::debug!(command = %line, "start canceled before spawn");
            return Err(ExecError::Canceled);
        }
        options.validate()?;
        let runtime = self.runtime()?;

        let mut cmd = self.command(arguments, &options);
        let child = {
            let _enter = runtime.enter();
            cmd.spawn()
                .map_err(|source| ExecError::SpawnFailed { command: line.clone(), source })?
        };
        tracing::debug!(pid = child.id(), command = %line, "process started");

        Ok(Box::new(SystemProcess::attach(child, &runtime, line, &options)))
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
