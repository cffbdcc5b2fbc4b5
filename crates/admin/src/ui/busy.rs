//! Process-wide busy indicator.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A single busy flag shown while a backend call is in flight.
///
/// There is no reference counting: `hide` clears the flag even if another
/// call started in the meantime is still running, so with overlapping calls
/// the indicator goes away when the first one finishes.
#[derive(Debug, Clone, Default)]
pub struct BusyIndicator {
    busy: Arc<AtomicBool>,
}

impl BusyIndicator {
    /// Create a hidden indicator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the indicator.
    pub fn show(&self) {
        self.busy.store(true, Ordering::SeqCst);
    }

    /// Hide the indicator.
    pub fn hide(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }

    /// Whether the indicator is currently shown.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Show the indicator until the returned guard is dropped.
    #[must_use = "the indicator hides as soon as the guard is dropped"]
    pub fn begin(&self) -> BusyGuard {
        self.show();
        BusyGuard {
            indicator: self.clone(),
        }
    }
}

/// Hides the [`BusyIndicator`] on drop.
#[derive(Debug)]
pub struct BusyGuard {
    indicator: BusyIndicator,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.indicator.hide();
    }
}
