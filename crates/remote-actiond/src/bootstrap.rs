//! Daemon bootstrap orchestration.

use std::io::{BufRead, Write};
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use remote_action::{ActionRegistry, ConfigError, Dispatcher, InvokeLimits, RemoteService};
use remote_action_config::{Config, ConfigValidationError};

use crate::health::HealthReporter;
use crate::server::{LineServer, ServeSummary, ServerError};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that returns a configuration resolved elsewhere.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Configuration loaded but holds unusable values.
    #[error("invalid configuration: {source}")]
    Validation {
        /// The offending setting.
        #[source]
        source: ConfigValidationError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The action registry could not be built.
    #[error("failed to build action registry: {source}")]
    Registry {
        /// Registration conflict or invalid parameter list.
        #[source]
        source: ConfigError,
    },
}

/// A configured daemon ready to serve a request stream.
pub struct Daemon {
    config: Config,
    registry: ActionRegistry,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the action registry.
    #[must_use]
    pub const fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Invoke limits derived from the configured timeout.
    #[must_use]
    pub fn limits(&self) -> InvokeLimits {
        match self.config.invoke_timeout() {
            Some(timeout) => InvokeLimits::new().with_timeout(timeout),
            None => InvokeLimits::new(),
        }
    }

    /// Serves line-delimited requests from `reader` until end of input.
    ///
    /// # Errors
    ///
    /// Returns a [`ServerError`] when the stream cannot be read or a response
    /// cannot be written.
    pub fn serve<R, W>(&self, reader: R, writer: W) -> Result<ServeSummary, ServerError>
    where
        R: BufRead,
        W: Write,
    {
        let dispatcher = Dispatcher::new(&self.registry).with_limits(self.limits());
        let server = LineServer::new(dispatcher, self.config.max_request_bytes());
        match server.serve(reader, writer) {
            Ok(summary) => {
                self.reporter.session_finished(&summary);
                Ok(summary)
            }
            Err(error) => {
                self.reporter.session_failed(&error);
                Err(error)
            }
        }
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// # Errors
///
/// Returns a [`BootstrapError`] when configuration, telemetry or registry
/// construction fails. The reporter is told about the failure first.
pub fn bootstrap_with<I>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    services: I,
) -> Result<Daemon, BootstrapError>
where
    I: IntoIterator<Item = Arc<dyn RemoteService>>,
{
    reporter.bootstrap_starting();
    match assemble(loader, services) {
        Ok((config, registry, telemetry)) => {
            reporter.bootstrap_succeeded(&config, &registry);
            Ok(Daemon {
                config,
                registry,
                telemetry,
                reporter,
            })
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

fn assemble<I>(
    loader: &dyn ConfigLoader,
    services: I,
) -> Result<(Config, ActionRegistry, TelemetryHandle), BootstrapError>
where
    I: IntoIterator<Item = Arc<dyn RemoteService>>,
{
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    config
        .validate()
        .map_err(|source| BootstrapError::Validation { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    let registry =
        ActionRegistry::build(services).map_err(|source| BootstrapError::Registry { source })?;
    Ok((config, registry, telemetry))
}
