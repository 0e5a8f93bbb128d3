//! # Retry coordinator
//!
//! Bounded re-invocation of an async operation, gated by a predicate over
//! the normalized error, with linear backoff between attempts.

mod coordinator;
mod policy;

pub use coordinator::{with_retry, Retrying};
pub use policy::{default_should_retry, RetryPolicy, RetryPredicate};
