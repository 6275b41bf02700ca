// src/core/control.rs — Cooperative run controls

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};

use super::state::AgentState;
use crate::report::{self, ArtifactExport, RunReport};

/// Shared flags observed by the loop at its checkpoints.
///
/// Stop and pause are requests: the loop applies them between suspension
/// points, never mid-call, so an in-flight service call always finishes
/// or times out on its own terms.
#[derive(Debug, Default)]
pub(crate) struct Controls {
    stop: AtomicBool,
    paused: AtomicBool,
    wake: Notify,
}

impl Controls {
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        // Clear pause so a paused loop observes the stop flag and exits
        // without an explicit resume.
        self.paused.store(false, Ordering::SeqCst);
        self.wake.notify_waiters();
    }

    pub fn request_pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn request_resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.wake.notify_waiters();
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn pause_requested(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Block until resume or stop. Registers the waiter before the final
    /// flag check so a wake between check and await is never lost.
    pub async fn wait_while_paused(&self) {
        loop {
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.pause_requested() || self.stop_requested() {
                return;
            }
            notified.await;
        }
    }

    /// Inter-iteration delay, cut short by a control signal so stop and
    /// resume reach the next checkpoint promptly.
    pub async fn interruptible_sleep(&self, delay: Duration) {
        let notified = self.wake.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.stop_requested() {
            return;
        }
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = &mut notified => {}
        }
    }
}

/// Host-facing control surface for one run.
///
/// Cheap to clone; all clones drive the same run. Control requests take
/// effect at the loop's next checkpoint.
#[derive(Clone)]
pub struct AgentHandle {
    controls: Arc<Controls>,
    snapshots: watch::Receiver<AgentState>,
}

impl AgentHandle {
    pub(crate) fn new(controls: Arc<Controls>, snapshots: watch::Receiver<AgentState>) -> Self {
        Self {
            controls,
            snapshots,
        }
    }

    /// Request a pause. No-op once the run has stopped.
    pub fn pause(&self) {
        self.controls.request_pause();
    }

    /// Resume a paused run.
    pub fn resume(&self) {
        self.controls.request_resume();
    }

    /// Request a stop. Idempotent; also clears a pending pause.
    pub fn stop(&self) {
        self.controls.request_stop();
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> AgentState {
        self.snapshots.borrow().clone()
    }

    /// Watch the snapshot stream.
    pub fn subscribe(&self) -> watch::Receiver<AgentState> {
        self.snapshots.clone()
    }

    /// Serialize the current run state into an exportable report.
    pub fn export_report(&self) -> RunReport {
        RunReport::from_state(&self.snapshot())
    }

    /// Retained {iteration, artifact} pairs. Simulate-only runs retain
    /// none.
    pub fn export_artifacts(&self) -> Vec<ArtifactExport> {
        report::artifacts_from_state(&self.snapshot())
    }
}
