//! The tracking gate: a shared on/off switch composed around tracking calls.
//!
//! Code paths that optionally report to the tracking server wrap their calls
//! in [`TrackingSwitch::guard`] instead of checking a flag by hand. While the
//! switch is off, guarded calls are suppressed entirely and surface only an
//! info-level log line.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared switch controlling whether tracking calls are forwarded.
///
/// Clones share the underlying flag, so the surrounding application can keep
/// one handle and flip it while a [`Tracker`](crate::Tracker) holds another.
/// All accesses are relaxed: the switch is a coarse, rarely-changed control,
/// and a toggle concurrent with a call carries no ordering guarantee.
#[derive(Debug, Clone)]
pub struct TrackingSwitch {
    active: Arc<AtomicBool>,
}

impl TrackingSwitch {
    /// Create a new switch in the given state.
    pub fn new(active: bool) -> Self {
        Self {
            active: Arc::new(AtomicBool::new(active)),
        }
    }

    /// Turn tracking on.
    pub fn enable(&self) {
        self.set_active(true);
    }

    /// Turn tracking off.
    pub fn disable(&self) {
        self.set_active(false);
    }

    /// Set the switch state.
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }

    /// Whether tracking is currently active. Read on every guarded call.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Run `op` only while tracking is active.
    ///
    /// When active, `op` is invoked exactly once and its result comes back as
    /// `Ok(Some(value))`; any error propagates unchanged, the gate adds no
    /// handling of its own. When inactive, `op` is never invoked, an
    /// info-level line names the skipped operation, and the call yields
    /// `Ok(None)`. Callers must tolerate the missing value.
    pub fn guard<T, E, F>(&self, operation: &str, op: F) -> Result<Option<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if self.is_active() {
            op().map(Some)
        } else {
            tracing::info!("Tracking inactive, skipping {}", operation);
            Ok(None)
        }
    }
}

impl Default for TrackingSwitch {
    /// Tracking starts active.
    fn default() -> Self {
        Self::new(true)
    }
}
