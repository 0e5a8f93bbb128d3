//! User-facing failure notification

use std::sync::Mutex;

use crate::errors::StandardError;

/// Receives every failure that should be surfaced to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, error: &StandardError);
}

/// Notifier that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _: &StandardError) {}
}

/// Notifier that records every failure in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    records: Mutex<Vec<StandardError>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded failures
    pub fn records(&self) -> Vec<StandardError> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, error: &StandardError) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(error.clone());
    }
}
