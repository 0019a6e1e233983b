//! Infrastructure implementation of the `ProcessSpawner` port.
//!
//! `TokioProcessSpawner` launches detached worker processes with
//! `kill_on_drop` set, so a supervisor that unwinds without running
//! teardown still takes its workers with it.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};

use crate::application::ports::{ProcessSpawner, SignalKind};

/// Production `ProcessSpawner` backed by `tokio::process` and unix signals.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessSpawner;

impl TokioProcessSpawner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSpawner for TokioProcessSpawner {
    fn spawn(
        &self,
        executable: &Path,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<tokio::process::Child> {
        let mut command = tokio::process::Command::new(executable);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        for (key, value) in env {
            command.env(key, value);
        }
        command
            .spawn()
            .with_context(|| format!("failed to spawn {}", executable.display()))
    }

    #[cfg(unix)]
    fn signal(&self, pid: u32, kind: SignalKind) -> Result<()> {
        let signal = match kind {
            SignalKind::Terminate => libc::SIGTERM,
            SignalKind::Kill => libc::SIGKILL,
        };
        let pid = i32::try_from(pid).with_context(|| format!("pid {pid} out of range"))?;
        // SAFETY: kill(2) with a valid signal number has no memory-safety
        // preconditions; the worst outcome is ESRCH for a dead pid.
        #[allow(unsafe_code)]
        let rc = unsafe { libc::kill(pid, signal) };
        if rc == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
                .with_context(|| format!("signalling pid {pid}"))
        }
    }

    #[cfg(not(unix))]
    fn signal(&self, _pid: u32, kind: SignalKind) -> Result<()> {
        anyhow::bail!("signal {kind:?} is not supported on this platform")
    }
}
