// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forced termination of a child and, optionally, its descendants.

use std::io;

use tokio::process::Child;

/// Send SIGKILL to the child's process group (tree) or to the child alone.
///
/// The child is spawned as the leader of its own group, so the group id is
/// its pid. A group that is already gone is not an error.
#[cfg(unix)]
pub(super) fn terminate(child: &mut Child, entire_process_tree: bool) -> io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if entire_process_tree {
        if let Some(pid) = child.id() {
            let pgid = i32::try_from(pid).map_err(io::Error::other)?;
            return match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => Ok(()),
                Err(e) => Err(e.into()),
            };
        }
    }
    child.start_kill()
}

#[cfg(not(unix))]
pub(super) fn terminate(child: &mut Child, entire_process_tree: bool) -> io::Result<()> {
    if entire_process_tree {
        tracing::debug!("process tree kill unsupported on this platform, killing the process only");
    }
    child.start_kill()
}
