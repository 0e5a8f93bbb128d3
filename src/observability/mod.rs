//! Observability for the API client
//!
//! - Structured JSON logs, one line per event
//! - Deterministic key ordering
//! - User-facing failure notification behind a trait

mod logger;
mod notifier;

pub use logger::{LogSink, Logger, MemoryLog, Severity};
pub use notifier::{MemoryNotifier, NoOpNotifier, Notifier};
