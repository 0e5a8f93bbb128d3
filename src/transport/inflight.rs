//! In-flight request accounting
//!
//! The count drives a busy indicator only; it never gates concurrency.

use std::sync::{Arc, OnceLock};

use tokio::sync::watch;

/// Shared count of outstanding requests.
///
/// Clones share the same count. The count never goes below zero.
#[derive(Debug, Clone)]
pub struct InFlightTracker {
    count: Arc<watch::Sender<usize>>,
}

impl Default for InFlightTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InFlightTracker {
    /// A fresh tracker starting at zero
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            count: Arc::new(count),
        }
    }

    /// The process-wide tracker
    pub fn global() -> Self {
        static GLOBAL: OnceLock<InFlightTracker> = OnceLock::new();
        GLOBAL.get_or_init(InFlightTracker::new).clone()
    }

    /// Count one request until the returned guard is dropped
    pub fn acquire(&self) -> InFlightGuard {
        self.count.send_modify(|n| *n += 1);
        InFlightGuard {
            tracker: self.clone(),
        }
    }

    fn release(&self) {
        self.count.send_modify(|n| *n = n.saturating_sub(1));
    }

    pub fn count(&self) -> usize {
        *self.count.borrow()
    }

    pub fn is_busy(&self) -> bool {
        self.count() > 0
    }

    /// Watch the count change
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.count.subscribe()
    }
}

/// Releases one in-flight slot when dropped
#[derive(Debug)]
#[must_use = "the request stops being counted as soon as the guard is dropped"]
pub struct InFlightGuard {
    tracker: InFlightTracker,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.tracker.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release() {
        let tracker = InFlightTracker::new();
        assert!(!tracker.is_busy());

        let a = tracker.acquire();
        let b = tracker.acquire();
        assert_eq!(tracker.count(), 2);

        drop(a);
        assert_eq!(tracker.count(), 1);
        drop(b);
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn test_release_clamps_at_zero() {
        let tracker = InFlightTracker::new();
        tracker.release();
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn test_clones_share_count() {
        let tracker = InFlightTracker::new();
        let clone = tracker.clone();
        let _guard = clone.acquire();
        assert_eq!(tracker.count(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_sees_changes() {
        let tracker = InFlightTracker::new();
        let mut rx = tracker.subscribe();

        let guard = tracker.acquire();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);

        drop(guard);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 0);
    }
}
