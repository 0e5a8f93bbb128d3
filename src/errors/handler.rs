//! Caller-side error handling
//!
//! [`ErrorHandler`] normalizes a failure, logs it, notifies the user and runs
//! an optional hook. [`Handled`] applies a handler to an async operation at
//! the call site.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::failure::Failure;
use super::kind::ErrorKind;
use super::normalize::normalize;
use super::standard::{ApiResult, StandardError};
use crate::observability::{Logger, NoOpNotifier, Notifier};

/// Hook run on every handled error
pub type ErrorHook = Arc<dyn Fn(&StandardError) + Send + Sync>;

/// Normalizes and reports failures
#[derive(Clone)]
pub struct ErrorHandler {
    log_error: bool,
    notify: bool,
    logger: Logger,
    notifier: Arc<dyn Notifier>,
    hook: Option<ErrorHook>,
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("log_error", &self.log_error)
            .field("notify", &self.notify)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl ErrorHandler {
    /// Log and notify every failure
    pub fn new(logger: Logger, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            log_error: true,
            notify: true,
            logger,
            notifier,
            hook: None,
        }
    }

    /// Normalize only
    pub fn silent() -> Self {
        Self {
            log_error: false,
            notify: false,
            logger: Logger::disabled(),
            notifier: Arc::new(NoOpNotifier),
            hook: None,
        }
    }

    pub fn log_errors(mut self, enabled: bool) -> Self {
        self.log_error = enabled;
        self
    }

    pub fn notify_user(mut self, enabled: bool) -> Self {
        self.notify = enabled;
        self
    }

    /// Run `hook` after logging and notification
    pub fn on_error(mut self, hook: impl Fn(&StandardError) + Send + Sync + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Normalize `raw` and report it
    pub fn handle(&self, raw: impl Into<Failure>) -> StandardError {
        let err = normalize(raw);

        if self.log_error {
            let details = err.details().map(|d| d.to_string()).unwrap_or_default();
            self.logger.error(
                "API_ERROR",
                &[
                    ("kind", err.kind().as_str()),
                    ("code", err.code().unwrap_or("")),
                    ("message", err.message()),
                    ("details", &details),
                ],
            );
        }
        if self.notify {
            self.notifier.notify(&err);
        }
        if let Some(hook) = &self.hook {
            hook(&err);
        }
        err
    }

    /// Wrap an async operation so every failure goes through this handler
    pub fn wrap<F>(&self, operation: F) -> Handled<F> {
        Handled {
            handler: self.clone(),
            operation,
        }
    }

    /// Run `operation`, reporting and swallowing any failure
    pub async fn safe_call<T, E, Fut>(&self, operation: impl FnOnce() -> Fut) -> Option<T>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
    {
        match operation().await {
            Ok(value) => Some(value),
            Err(err) => {
                self.handle(err);
                None
            }
        }
    }

    /// Report the failures of a batch.
    ///
    /// A single failure is reported as is; several are collapsed into one
    /// `Unknown` error counting them. Returns `None` when nothing failed.
    pub fn handle_batch<T>(&self, results: &[ApiResult<T>]) -> Option<StandardError> {
        let mut failures = results.iter().filter_map(|r| r.as_ref().err());
        let first = failures.next()?;
        let rest = failures.count();
        if rest == 0 {
            return Some(self.handle(first.clone()));
        }
        let message = format!("batch operation failed: {} operations failed", rest + 1);
        Some(self.handle(StandardError::new(ErrorKind::Unknown, message)))
    }
}

/// An async operation wrapped by an [`ErrorHandler`]
#[derive(Debug, Clone)]
pub struct Handled<F> {
    handler: ErrorHandler,
    operation: F,
}

impl<F> Handled<F> {
    /// Invoke a no-argument operation
    pub async fn run<T, E, Fut>(&self) -> ApiResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
    {
        (self.operation)().await.map_err(|err| self.handler.handle(err))
    }

    /// Invoke the operation with `args`
    pub async fn call<A, T, E, Fut>(&self, args: A) -> ApiResult<T>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
    {
        (self.operation)(args).await.map_err(|err| self.handler.handle(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportFailure;
    use crate::observability::MemoryNotifier;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recording() -> (ErrorHandler, Arc<MemoryNotifier>, crate::observability::MemoryLog) {
        let (logger, log) = Logger::memory();
        let notifier = Arc::new(MemoryNotifier::new());
        (ErrorHandler::new(logger, notifier.clone()), notifier, log)
    }

    #[test]
    fn test_handle_logs_and_notifies() {
        let (handler, notifier, log) = recording();
        let err = handler.handle(TransportFailure::status(503, None));

        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(notifier.len(), 1);
        let entries = log.events("API_ERROR");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["kind"], "SERVER_ERROR");
    }

    #[test]
    fn test_handle_switches() {
        let (handler, notifier, log) = recording();
        let handler = handler.log_errors(false).notify_user(false);
        handler.handle("boom");

        assert!(notifier.is_empty());
        assert!(log.lines().is_empty());
    }

    #[test]
    fn test_hook_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let handler = ErrorHandler::silent().on_error(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        handler.handle("boom");
        handler.handle("again");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_wrap_normalizes_failure() {
        let handler = ErrorHandler::silent();
        let wrapped = handler.wrap(|id: u64| async move {
            if id == 0 {
                Err(TransportFailure::timed_out())
            } else {
                Ok(id * 2)
            }
        });

        assert_eq!(wrapped.call(21).await.unwrap(), 42);
        let err = wrapped.call(0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_safe_call_swallows() {
        let (handler, notifier, _) = recording();

        let none: Option<u32> = handler
            .safe_call(|| async { Err::<u32, _>("failed") })
            .await;
        assert!(none.is_none());
        assert_eq!(notifier.len(), 1);

        let some = handler.safe_call(|| async { Ok::<_, Failure>(7) }).await;
        assert_eq!(some, Some(7));
    }

    #[test]
    fn test_handle_batch() {
        let handler = ErrorHandler::silent();

        let ok: Vec<ApiResult<u32>> = vec![Ok(1), Ok(2)];
        assert!(handler.handle_batch(&ok).is_none());

        let one: Vec<ApiResult<u32>> = vec![Ok(1), Err(StandardError::validation("bad"))];
        let err = handler.handle_batch(&one).unwrap();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "bad");

        let many: Vec<ApiResult<u32>> = vec![
            Err(StandardError::validation("a")),
            Ok(1),
            Err(StandardError::new(ErrorKind::Server, "b")),
        ];
        let err = handler.handle_batch(&many).unwrap();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.message(), "batch operation failed: 2 operations failed");
    }
}
