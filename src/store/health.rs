//! Store connection flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

/// Shared flag recording whether the store is usable.
///
/// Once marked disconnected it stays disconnected for the process lifetime.
#[derive(Debug, Clone)]
pub struct StoreHealth {
    connected: Arc<AtomicBool>,
}

impl StoreHealth {
    pub fn new(connected: bool) -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(connected)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Flips the flag to disconnected. Returns true only for the call that
    /// performed the transition.
    pub fn mark_disconnected(&self) -> bool {
        let flipped = self
            .connected
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if flipped {
            warn!("Store marked disconnected, reads now use the static fallback");
        }
        flipped
    }
}
