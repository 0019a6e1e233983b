//! Supervision and teardown of spawned worker processes.
//!
//! The supervisor owns every live worker handle. Teardown signals all
//! workers, waits out a bounded grace period, and escalates to a forced
//! kill for any straggler. Teardown is best effort and idempotent: it
//! collects per-process errors instead of aborting on the first one, and
//! a second call finds nothing to do.

use std::time::Duration;

use tokio::time::{Instant, timeout};

use crate::application::ports::{ProcessSpawner, SignalKind};
use crate::domain::NodeSpec;

/// One spawned worker under supervision.
#[derive(Debug)]
pub struct ProcessHandle {
    pub pid: u32,
    pub spec: NodeSpec,
    pub child: tokio::process::Child,
}

/// Outcome of a teardown pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TerminationReport {
    /// Workers that exited within the grace period.
    pub terminated: usize,
    /// Workers that had to be forcefully killed.
    pub forced: usize,
    /// Per-process failures, e.g. a signal that could not be delivered.
    pub errors: Vec<String>,
}

impl TerminationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Owns worker handles from spawn until teardown.
pub struct ProcessSupervisor {
    handles: Vec<ProcessHandle>,
    grace_period: Duration,
}

impl ProcessSupervisor {
    #[must_use]
    pub fn new(grace_period: Duration) -> Self {
        Self {
            handles: Vec::new(),
            grace_period,
        }
    }

    /// Take ownership of a spawned worker.
    pub fn adopt(&mut self, handle: ProcessHandle) {
        self.handles.push(handle);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn pids(&self) -> impl Iterator<Item = u32> + '_ {
        self.handles.iter().map(|h| h.pid)
    }

    /// Terminate every supervised worker.
    ///
    /// Delivers a graceful terminate signal to all workers first, then
    /// waits out a single shared grace window: every worker still alive
    /// when the window closes is forcefully killed, so teardown of a
    /// whole swarm is bounded by one grace period, not one per worker.
    /// Signal failures are recorded in the report rather than propagated,
    /// so one stuck process never blocks the rest. The supervised set is
    /// drained even when errors occur; calling this again is a no-op.
    pub async fn terminate_all(&mut self, spawner: &impl ProcessSpawner) -> TerminationReport {
        let mut report = TerminationReport::default();
        let handles: Vec<ProcessHandle> = self.handles.drain(..).collect();

        for handle in &handles {
            if let Err(e) = spawner.signal(handle.pid, SignalKind::Terminate) {
                report
                    .errors
                    .push(format!("terminate pid {}: {e}", handle.pid));
            }
        }

        let deadline = Instant::now() + self.grace_period;
        for mut handle in handles {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match timeout(remaining, handle.child.wait()).await {
                Ok(Ok(_status)) => report.terminated += 1,
                Ok(Err(e)) => report
                    .errors
                    .push(format!("wait on pid {}: {e}", handle.pid)),
                Err(_elapsed) => {
                    if let Err(e) = spawner.signal(handle.pid, SignalKind::Kill) {
                        report.errors.push(format!("kill pid {}: {e}", handle.pid));
                        continue;
                    }
                    match handle.child.wait().await {
                        Ok(_status) => report.forced += 1,
                        Err(e) => report
                            .errors
                            .push(format!("wait on killed pid {}: {e}", handle.pid)),
                    }
                }
            }
        }

        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;

    use anyhow::Result;

    use super::*;

    /// Spawns real short-lived processes and records delivered signals.
    struct RecordingSpawner {
        signals: RefCell<Vec<(u32, SignalKind)>>,
    }

    impl RecordingSpawner {
        fn new() -> Self {
            Self {
                signals: RefCell::new(Vec::new()),
            }
        }
    }

    impl ProcessSpawner for RecordingSpawner {
        fn spawn(
            &self,
            executable: &Path,
            args: &[String],
            _env: &[(String, String)],
        ) -> Result<tokio::process::Child> {
            let child = tokio::process::Command::new(executable)
                .args(args)
                .stdout(std::process::Stdio::null())
                .stderr(std::process::Stdio::null())
                .kill_on_drop(true)
                .spawn()?;
            Ok(child)
        }

        fn signal(&self, pid: u32, kind: SignalKind) -> Result<()> {
            self.signals.borrow_mut().push((pid, kind));
            // Real delivery is exercised by the infra implementation; here
            // the processes exit on their own.
            Ok(())
        }
    }

    fn spec(index: usize) -> NodeSpec {
        NodeSpec {
            index,
            address: None,
            rest_port: 8787 + u16::try_from(index).unwrap(),
            db_name: format!("sim-{}", 8787 + index),
            stake: None,
        }
    }

    #[tokio::test]
    async fn terminate_all_on_empty_supervisor_is_a_no_op() {
        let spawner = RecordingSpawner::new();
        let mut supervisor = ProcessSupervisor::new(Duration::from_secs(1));

        let first = supervisor.terminate_all(&spawner).await;
        let second = supervisor.terminate_all(&spawner).await;

        assert_eq!(first, TerminationReport::default());
        assert_eq!(second, TerminationReport::default());
        assert!(spawner.signals.borrow().is_empty());
    }

    #[tokio::test]
    async fn terminate_all_drains_and_waits_for_short_lived_workers() {
        let spawner = RecordingSpawner::new();
        let mut supervisor = ProcessSupervisor::new(Duration::from_secs(5));

        for index in 0..2 {
            let child = spawner
                .spawn(Path::new("true"), &[], &[])
                .expect("spawn true");
            let pid = child.id().expect("child pid");
            supervisor.adopt(ProcessHandle {
                pid,
                spec: spec(index),
                child,
            });
        }
        assert_eq!(supervisor.len(), 2);

        let report = supervisor.terminate_all(&spawner).await;
        assert!(supervisor.is_empty(), "supervised set drained");
        assert_eq!(report.terminated, 2);
        assert_eq!(report.forced, 0);
        assert!(report.is_clean(), "errors: {:?}", report.errors);

        let signals = spawner.signals.borrow();
        assert_eq!(signals.len(), 2);
        assert!(signals.iter().all(|(_, k)| *k == SignalKind::Terminate));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn grace_window_is_shared_across_all_stuck_workers() {
        /// Ignores the graceful signal so every worker outlives the grace
        /// window; kill is delivered for real.
        struct StubbornSpawner(RecordingSpawner);
        impl ProcessSpawner for StubbornSpawner {
            fn spawn(
                &self,
                executable: &Path,
                args: &[String],
                env: &[(String, String)],
            ) -> Result<tokio::process::Child> {
                self.0.spawn(executable, args, env)
            }
            fn signal(&self, pid: u32, kind: SignalKind) -> Result<()> {
                if kind == SignalKind::Kill {
                    std::process::Command::new("kill")
                        .args(["-9", &pid.to_string()])
                        .status()?;
                }
                Ok(())
            }
        }

        let grace = Duration::from_millis(400);
        let spawner = StubbornSpawner(RecordingSpawner::new());
        let mut supervisor = ProcessSupervisor::new(grace);
        for index in 0..3 {
            let child = spawner
                .spawn(Path::new("sleep"), &["30".to_string()], &[])
                .expect("spawn sleep");
            let pid = child.id().expect("child pid");
            supervisor.adopt(ProcessHandle {
                pid,
                spec: spec(index),
                child,
            });
        }

        let started = std::time::Instant::now();
        let report = supervisor.terminate_all(&spawner).await;
        let elapsed = started.elapsed();

        assert_eq!(report.forced, 3, "every worker escalated to kill");
        assert_eq!(report.terminated, 0);
        assert!(report.is_clean(), "errors: {:?}", report.errors);
        // One shared window: well under 3 x grace even with all workers stuck.
        assert!(
            elapsed < grace * 3,
            "teardown took {elapsed:?} for grace {grace:?}"
        );
    }

    #[tokio::test]
    async fn signal_failure_is_reported_without_blocking_other_workers() {
        struct FailingSpawner(RecordingSpawner);
        impl ProcessSpawner for FailingSpawner {
            fn spawn(
                &self,
                executable: &Path,
                args: &[String],
                env: &[(String, String)],
            ) -> Result<tokio::process::Child> {
                self.0.spawn(executable, args, env)
            }
            fn signal(&self, _pid: u32, _kind: SignalKind) -> Result<()> {
                anyhow::bail!("no such process")
            }
        }

        let spawner = FailingSpawner(RecordingSpawner::new());
        let mut supervisor = ProcessSupervisor::new(Duration::from_secs(5));
        for index in 0..2 {
            let child = spawner
                .spawn(Path::new("true"), &[], &[])
                .expect("spawn true");
            let pid = child.id().expect("child pid");
            supervisor.adopt(ProcessHandle {
                pid,
                spec: spec(index),
                child,
            });
        }

        let report = supervisor.terminate_all(&spawner).await;
        assert!(supervisor.is_empty());
        assert_eq!(report.errors.len(), 2, "one error per failed signal");
        // The children exit on their own regardless of signalling.
        assert_eq!(report.terminated, 2);
    }
}
