//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag checked by [`Simulation::run`][crate::Simulation::run]
/// between ticks.  A tick that has started always completes.
///
/// Cloning yields another handle to the same flag, so a handle can be moved
/// into a signal handler, an observer or another thread.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear a previous request so `run` can be resumed.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}
