//! Lifecycle events reported through `tracing`.

use std::sync::Arc;

use remote_action::ActionRegistry;
use remote_action_config::Config;

use crate::bootstrap::BootstrapError;
use crate::server::{ServeSummary, ServerError};

const HEALTH_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::health");

/// Observer for daemon lifecycle events.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked once the registry is built and the daemon can serve.
    fn bootstrap_succeeded(&self, config: &Config, registry: &ActionRegistry);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the request stream reaches end of input.
    fn session_finished(&self, summary: &ServeSummary);

    /// Invoked when the request stream fails.
    fn session_failed(&self, error: &ServerError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config, registry: &ActionRegistry) {
        (**self).bootstrap_succeeded(config, registry);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn session_finished(&self, summary: &ServeSummary) {
        (**self).session_finished(summary);
    }

    fn session_failed(&self, error: &ServerError) {
        (**self).session_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config, registry: &ActionRegistry) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            actions = registry.len(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            invoke_timeout_ms = ?config.invoke_timeout_ms,
            max_request_bytes = config.max_request_bytes(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn session_finished(&self, summary: &ServeSummary) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_finished",
            payloads = summary.payloads,
            responses = summary.responses,
            "request stream closed"
        );
    }

    fn session_failed(&self, error: &ServerError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "session_failed",
            error = %error,
            "request stream failed"
        );
    }
}
