//! # Error taxonomy
//!
//! Every failure an operation can produce is normalized into one
//! [`StandardError`] carrying a closed [`ErrorKind`].

mod failure;
mod handler;
mod kind;
mod normalize;
mod standard;

pub use failure::{Failure, TransportFailure, NETWORK_ERROR_MESSAGE, TIMEOUT_CODES};
pub use handler::{ErrorHandler, ErrorHook, Handled};
pub use kind::ErrorKind;
pub use normalize::{business_error, is_business_failure, normalize};
pub use standard::{ApiResult, StandardError};

/// Local argument check failed before any network call
pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
/// Server payload failed a shape check
pub const INVALID_DATA_FORMAT: &str = "INVALID_DATA_FORMAT";

// Business codes reported by the rule service
pub const RULE_NOT_FOUND: &str = "RULE_NOT_FOUND";
pub const RULE_NAME_DUPLICATE: &str = "RULE_NAME_DUPLICATE";
pub const RULE_SYNTAX_ERROR: &str = "RULE_SYNTAX_ERROR";
pub const RULE_VALIDATION_ERROR: &str = "RULE_VALIDATION_ERROR";
pub const CONTAINER_SYNC_FAILED: &str = "CONTAINER_SYNC_FAILED";
pub const RULE_EXECUTION_FAILED: &str = "RULE_EXECUTION_FAILED";

/// Business codes the caller surfaces inline; never notified globally
pub const SILENT_CODES: [&str; 2] = [RULE_VALIDATION_ERROR, RULE_SYNTAX_ERROR];
