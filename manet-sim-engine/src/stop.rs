use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal.
///
/// Grounded on `original_source/simulation_engine/config.py`'s module-level
/// `stop_simulation` flag plus `set_stop`/`get_stop`/`reset`. That global is
/// plain-Python and relies on the GIL; here it's an `Arc<AtomicBool>` so a
/// host thread driving the run controller can request a stop while the
/// scheduler thread is mid-run (the sole cross-thread channel into a
/// running simulation, per the concurrency model).
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Builds a fresh, unset flag.
    pub fn new() -> StopFlag {
        StopFlag(Arc::new(AtomicBool::new(false)))
    }

    /// Requests that every process observing this flag wind down at its
    /// next yield boundary.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
