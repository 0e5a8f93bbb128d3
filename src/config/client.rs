//! API client configuration

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::environment::Environment;
use super::errors::{ConfigError, ConfigResult};
use super::{BASE_URL_VAR, ENV_VAR, MAX_RETRIES_VAR, RETRY_DELAY_VAR, TIMEOUT_VAR};
use crate::observability::{Logger, Severity};
use crate::retry::RetryPolicy;

/// API client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Deployment environment (default: development)
    #[serde(default)]
    pub environment: Environment,

    /// Base URL every path is relative to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in milliseconds (default: 30000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Total attempts for retried calls (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between attempts in milliseconds (default: 1000)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Recorded for reference; the retry backoff is linear
    #[serde(default = "default_retry_multiplier")]
    pub retry_multiplier: u32,

    #[serde(default)]
    pub enable_logging: bool,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Limits applied to rule imports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum file size in bytes (default: 10 MiB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Accepted file extensions, with the leading dot
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

/// Page size bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_min_page_size")]
    pub min_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_retry_multiplier() -> u32 {
    2
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    vec![".drl".to_string(), ".txt".to_string(), ".json".to_string()]
}

fn default_page_size() -> u64 {
    20
}

fn default_min_page_size() -> u64 {
    5
}

fn default_max_page_size() -> u64 {
    100
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            min_page_size: default_min_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl PaginationConfig {
    pub fn contains(&self, size: u64) -> bool {
        (self.min_page_size..=self.max_page_size).contains(&size)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_multiplier: default_retry_multiplier(),
            enable_logging: false,
            upload: UploadConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Preset for a deployment environment
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            timeout_ms: environment.timeout_ms(),
            enable_logging: environment.logging_enabled(),
            ..Self::default()
        }
    }

    /// Preset selected by `RULEDESK_ENV`, with overrides from the process
    /// environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let environment = match lookup(ENV_VAR) {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };
        let mut config = Self::for_environment(environment);

        if let Some(url) = lookup(BASE_URL_VAR) {
            config.base_url = url;
        }
        if let Some(value) = lookup(TIMEOUT_VAR) {
            config.timeout_ms = parse_var(TIMEOUT_VAR, &value)?;
        }
        if let Some(value) = lookup(MAX_RETRIES_VAR) {
            config.max_retries = parse_var(MAX_RETRIES_VAR, &value)?;
        }
        if let Some(value) = lookup(RETRY_DELAY_VAR) {
            config.retry_delay_ms = parse_var(RETRY_DELAY_VAR, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("base_url must not be empty"));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid("timeout_ms must be > 0"));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::invalid("max_retries must be > 0"));
        }
        let pages = &self.pagination;
        if pages.min_page_size == 0 || pages.min_page_size > pages.max_page_size {
            return Err(ConfigError::invalid(format!(
                "page size bounds {}..={} are invalid",
                pages.min_page_size, pages.max_page_size
            )));
        }
        if !pages.contains(pages.default_page_size) {
            return Err(ConfigError::invalid(format!(
                "default_page_size {} is outside {}..={}",
                pages.default_page_size, pages.min_page_size, pages.max_page_size
            )));
        }
        if self.upload.max_file_size == 0 {
            return Err(ConfigError::invalid("upload.max_file_size must be > 0"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Default retry policy for this deployment
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
            .with_logger(self.logger())
    }

    /// Logger honoring `enable_logging`; logs go to stderr
    pub fn logger(&self) -> Logger {
        if self.enable_logging {
            Logger::stderr(Severity::Trace)
        } else {
            Logger::disabled()
        }
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var,
        value: value.to_string(),
    })
}
