//! Structured telemetry for the daemon.
//!
//! Standard output carries JSON-RPC responses, so every log event goes to
//! standard error. The subscriber is installed once per process; the format
//! chosen by that first installation is reported on every later handle.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use remote_action_config::{Config, LogFormat};

static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Proof that the global subscriber is in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Format of the installed subscriber, which may differ from the
    /// configuration passed to a later [`initialise`] call.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter expression does not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Expression as configured.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another subscriber was installed outside this module.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global subscriber on first use.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparsable filter and
/// [`TelemetryError::Subscriber`] when a foreign global subscriber exists.
/// A failed first call leaves nothing installed, so a later call may retry.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED_FORMAT
        .get_or_try_init(|| {
            let subscriber = build_subscriber(config)?;
            tracing::subscriber::set_global_default(subscriber)
                .map_err(TelemetryError::Subscriber)?;
            Ok(config.log_format())
        })
        .map(|format| TelemetryHandle { format: *format })
}

fn build_subscriber(config: &Config) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter {
        filter: config.log_filter().to_owned(),
        message: error.to_string(),
    })?;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn config(filter: &str, format: LogFormat) -> Config {
        Config {
            log_filter: filter.to_owned(),
            log_format: format,
            ..Config::default()
        }
    }

    #[rstest]
    #[case::plain("info", LogFormat::Json)]
    #[case::per_target("remote_action=debug,warn", LogFormat::Compact)]
    fn valid_filters_build_a_subscriber(#[case] filter: &str, #[case] format: LogFormat) {
        assert!(build_subscriber(&config(filter, format)).is_ok());
    }

    #[test]
    fn invalid_filter_names_the_expression() {
        let Err(error) = build_subscriber(&config("remote_action=loudest", LogFormat::Json)) else {
            panic!("filter should be rejected");
        };
        assert!(
            matches!(&error, TelemetryError::Filter { filter, .. } if filter == "remote_action=loudest"),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn later_calls_report_the_installed_format() {
        let first = initialise(&config("info", LogFormat::Compact)).expect("first install");
        let second = initialise(&config("debug", LogFormat::Json)).expect("already installed");
        assert_eq!(first, second);
    }
}
