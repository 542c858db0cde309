//! Configuration for the remote action daemon.
//!
//! [`Config`] is loaded through `ortho_config`, which layers built-in
//! defaults, an optional configuration file, `REMOTE_ACTIOND_*` environment
//! variables and command-line flags, in increasing order of precedence.
//! Values are checked with [`Config::validate`] before the daemon starts.

mod defaults;
mod logging;

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_REQUEST_BYTES, default_log_filter, default_log_filter_string,
    default_log_format, default_max_request_bytes,
};
pub use self::logging::{LogFormat, LogFormatParseError};

/// Daemon settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "REMOTE_ACTIOND")]
pub struct Config {
    /// `tracing` filter expression, e.g. `info` or `remote_action=debug`.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for log events.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Upper bound on a single invocation, in milliseconds. Unset means no
    /// limit.
    #[serde(default)]
    pub invoke_timeout_ms: Option<u64>,
    /// Largest accepted request line, in bytes.
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            invoke_timeout_ms: None,
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

impl Config {
    /// Filter expression handed to the log subscriber.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Invocation timeout, if configured.
    #[must_use]
    pub const fn invoke_timeout(&self) -> Option<Duration> {
        match self.invoke_timeout_ms {
            Some(millis) => Some(Duration::from_millis(millis)),
            None => None,
        }
    }

    /// Largest accepted request line, in bytes.
    #[must_use]
    pub const fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
    }

    /// Rejects settings the daemon cannot run with.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigValidationError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.log_filter.trim().is_empty() {
            return Err(ConfigValidationError::EmptyLogFilter);
        }
        if self.invoke_timeout_ms == Some(0) {
            return Err(ConfigValidationError::ZeroTimeout);
        }
        if self.max_request_bytes == 0 {
            return Err(ConfigValidationError::ZeroRequestLimit);
        }
        Ok(())
    }
}

/// Settings that load successfully but cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    /// The log filter is blank.
    #[error("log_filter must not be empty")]
    EmptyLogFilter,
    /// A zero timeout would fail every call.
    #[error("invoke_timeout_ms must be greater than zero; omit it to disable the timeout")]
    ZeroTimeout,
    /// A zero size limit would reject every request.
    #[error("max_request_bytes must be greater than zero")]
    ZeroRequestLimit,
}
