//! Retry policy

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::StandardError;
use crate::observability::Logger;

/// Decides whether a failed attempt may be retried
pub type RetryPredicate = Arc<dyn Fn(&StandardError) -> bool + Send + Sync>;

/// Retry only transient failures: `Network`, `Timeout` and `Server`
pub fn default_should_retry(err: &StandardError) -> bool {
    err.kind().is_transient()
}

/// How many times to try, how long to wait, and which failures to retry.
///
/// The wait before attempt `n + 1` is `base_delay * n`.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    should_retry: RetryPredicate,
    logger: Logger,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .finish()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

impl RetryPolicy {
    /// `max_attempts` below 1 is raised to 1
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            should_retry: Arc::new(default_should_retry),
            logger: Logger::disabled(),
        }
    }

    /// A single unretried attempt
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&StandardError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.should_retry = Arc::new(predicate);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn should_retry(&self, err: &StandardError) -> bool {
        (self.should_retry)(err)
    }

    /// Wait after failed attempt `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    pub(crate) fn logger(&self) -> &Logger {
        &self.logger
    }
}
