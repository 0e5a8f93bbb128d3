//! Retry loop

use std::future::Future;

use super::policy::RetryPolicy;
use crate::errors::{normalize, ApiResult, Failure};

/// Run `operation` until it succeeds, the policy refuses a retry, or the
/// attempts run out.
///
/// Every failure is normalized before the predicate sees it. The last
/// normalized error is returned as is.
pub async fn with_retry<T, E, F, Fut>(mut operation: F, policy: &RetryPolicy) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Failure>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(raw) => normalize(raw),
        };
        if attempt >= max_attempts || !policy.should_retry(&err) {
            return Err(err);
        }

        let delay = policy.delay_after(attempt);
        policy.logger().warn(
            "API_RETRY",
            &[
                ("attempt", &attempt.to_string()),
                ("delay_ms", &delay.as_millis().to_string()),
                ("kind", err.kind().as_str()),
                ("max_attempts", &max_attempts.to_string()),
                ("message", err.message()),
            ],
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// An async operation bound to a retry policy
#[derive(Debug, Clone)]
pub struct Retrying<F> {
    policy: RetryPolicy,
    operation: F,
}

impl<F> Retrying<F> {
    pub fn new(operation: F, policy: RetryPolicy) -> Self {
        Self { policy, operation }
    }

    pub async fn run<T, E, Fut>(&self) -> ApiResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
    {
        with_retry(|| (self.operation)(), &self.policy).await
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}
