//! In-flight command suppression flag
//!
//! While a locally issued command is in flight the remote usually reports a
//! transient "no devices" state. The flag marks that window so the sync
//! controller can treat one such report as noise.
//!
//! This is a single bit, not a counter: two overlapping commands share it and
//! the first to finish clears it for both.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SuppressionFlag(Arc<AtomicBool>);

impl SuppressionFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Reset the flag, returning whether it was set
    pub fn consume(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}
