//! # Client configuration
//!
//! Settings are selected per deployment environment and may be overridden
//! from the process environment or a JSON file. They never vary per call.

mod client;
mod environment;
mod errors;

pub use client::{ClientConfig, PaginationConfig, UploadConfig};
pub use environment::Environment;
pub use errors::{ConfigError, ConfigResult};

/// Selects the deployment environment
pub const ENV_VAR: &str = "RULEDESK_ENV";
pub const BASE_URL_VAR: &str = "RULEDESK_API_BASE_URL";
pub const TIMEOUT_VAR: &str = "RULEDESK_TIMEOUT_MS";
pub const MAX_RETRIES_VAR: &str = "RULEDESK_MAX_RETRIES";
pub const RETRY_DELAY_VAR: &str = "RULEDESK_RETRY_DELAY_MS";
