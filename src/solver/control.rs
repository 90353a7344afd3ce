//! Pause, resume and cancel for a running solve.
//!
//! A [`SolverControl`] is a cheap cloneable handle. Workers call
//! [`SolverControl::checkpoint`] between units of work. While the run is
//! neither paused nor cancelled a checkpoint is two atomic loads; only a
//! paused run takes the lock and blocks on a condition variable. Once the run
//! is cancelled the call returns `false` so the worker can drop what it was
//! doing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct ControlState {
    cancelled: AtomicBool,
    paused: AtomicBool,
    /// Serializes flag changes with waiters so a wakeup is never missed.
    gate: Mutex<()>,
    resumed: Condvar,
}

#[derive(Debug, Clone, Default)]
pub struct SolverControl {
    state: Arc<ControlState>,
}

impl SolverControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn gate(&self) -> MutexGuard<'_, ()> {
        self.state
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Requests cancellation. Paused workers wake up and stop.
    pub fn cancel(&self) {
        let _gate = self.gate();
        self.state.cancelled.store(true, Ordering::Release);
        self.state.resumed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    pub fn pause(&self) {
        let _gate = self.gate();
        self.state.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        let _gate = self.gate();
        self.state.paused.store(false, Ordering::Release);
        self.state.resumed.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused.load(Ordering::Acquire)
    }

    /// Blocks while paused. Returns `true` if work should go on and `false`
    /// once the run has been cancelled.
    pub fn checkpoint(&self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        if !self.is_paused() {
            return true;
        }
        let mut gate = self.gate();
        while self.is_paused() && !self.is_cancelled() {
            gate = self
                .state
                .resumed
                .wait(gate)
                .unwrap_or_else(PoisonError::into_inner);
        }
        !self.is_cancelled()
    }
}
