//! CLI-specific error types

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::errors::StandardError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    Input(String),

    /// A failed API operation
    #[error("{0}")]
    Api(#[from] StandardError),
}

impl CliError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Get the error code string
    pub fn code_str(&self) -> &str {
        match self {
            Self::Config(_) => "RULEDESK_CLI_CONFIG_ERROR",
            Self::Io(_) => "RULEDESK_CLI_IO_ERROR",
            Self::Json(_) => "RULEDESK_CLI_JSON_ERROR",
            Self::Input(_) => "RULEDESK_CLI_INPUT_ERROR",
            Self::Api(err) => err.code().unwrap_or(err.kind().as_str()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_codes() {
        assert_eq!(CliError::input("x").code_str(), "RULEDESK_CLI_INPUT_ERROR");

        let api: CliError = StandardError::new(ErrorKind::Timeout, "slow").into();
        assert_eq!(api.code_str(), "TIMEOUT_ERROR");

        let coded: CliError = StandardError::validation("bad").into();
        assert_eq!(coded.code_str(), "INVALID_REQUEST");
    }
}
