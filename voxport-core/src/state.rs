//! Loading-state coordination — busy/error reporting around a batch run.
//!
//! The importer consumes this as a capability: `start_loading` and
//! `stop_loading` bracket one full batch, and `set_error` surfaces the
//! batch-level aggregate failure once all branches have finished.

use std::sync::Mutex;
use tracing::{debug, warn};

/// Capability contract the importer reports loading progress through.
pub trait LoadingStatus: Send + Sync {
    fn start_loading(&self);
    fn stop_loading(&self);
    fn set_error(&self, error: anyhow::Error);
}

#[derive(Debug, Default)]
struct TrackerInner {
    active_batches: usize,
    error: Option<String>,
}

/// Default coordinator: counts nested batch brackets and keeps the latest
/// aggregate error message for callers to query.
#[derive(Default)]
pub struct LoadingTracker {
    inner: Mutex<TrackerInner>,
}

impl LoadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().expect("loading tracker poisoned").active_batches > 0
    }

    /// Latest aggregate error message, if any batch has failed.
    pub fn error(&self) -> Option<String> {
        self.inner.lock().expect("loading tracker poisoned").error.clone()
    }

    pub fn clear_error(&self) {
        self.inner.lock().expect("loading tracker poisoned").error = None;
    }
}

impl LoadingStatus for LoadingTracker {
    fn start_loading(&self) {
        let mut inner = self.inner.lock().expect("loading tracker poisoned");
        inner.active_batches += 1;
        debug!(active = inner.active_batches, "batch load started");
    }

    fn stop_loading(&self) {
        let mut inner = self.inner.lock().expect("loading tracker poisoned");
        inner.active_batches = inner.active_batches.saturating_sub(1);
        debug!(active = inner.active_batches, "batch load finished");
    }

    fn set_error(&self, error: anyhow::Error) {
        warn!(%error, "batch load reported errors");
        self.inner.lock().expect("loading tracker poisoned").error = Some(error.to_string());
    }
}

/// Discards all loading updates; useful in tests and headless callers.
pub struct NoOpLoading;

impl LoadingStatus for NoOpLoading {
    fn start_loading(&self) {}
    fn stop_loading(&self) {}
    fn set_error(&self, _error: anyhow::Error) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracketing_tracks_busy_state() {
        let tracker = LoadingTracker::new();
        assert!(!tracker.is_loading());

        tracker.start_loading();
        tracker.start_loading();
        assert!(tracker.is_loading());

        tracker.stop_loading();
        assert!(tracker.is_loading());
        tracker.stop_loading();
        assert!(!tracker.is_loading());

        // Unbalanced stop never underflows.
        tracker.stop_loading();
        assert!(!tracker.is_loading());
    }

    #[test]
    fn test_error_is_kept_until_cleared() {
        let tracker = LoadingTracker::new();
        assert!(tracker.error().is_none());

        tracker.set_error(anyhow::anyhow!("- a.zip: could not open archive"));
        assert_eq!(
            tracker.error().as_deref(),
            Some("- a.zip: could not open archive")
        );

        tracker.clear_error();
        assert!(tracker.error().is_none());
    }
}
