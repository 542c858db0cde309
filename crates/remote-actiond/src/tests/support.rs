//! Test harness for the daemon behavioural suite.

use std::ffi::OsString;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use ortho_config::{OrthoConfig, OrthoError};

use remote_action::{ActionRegistry, RemoteService};
use remote_action_config::Config;

use crate::bootstrap::{BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, bootstrap_with};
use crate::health::HealthReporter;
use crate::server::{ServeSummary, ServerError};
use crate::services::{EchoService, default_services};

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    services: Vec<Arc<dyn RemoteService>>,
    pub reporter: Arc<RecordingHealthReporter>,
    daemon: Option<Daemon>,
    bootstrap_error: Option<BootstrapError>,
    output: Option<Result<String, ServerError>>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            loader: Box::new(StaticConfigLoader::new(Config::default())),
            services: default_services(),
            reporter: Arc::new(RecordingHealthReporter::default()),
            daemon: None,
            bootstrap_error: None,
            output: None,
        }
    }

    /// Replaces the loader with one returning `config`.
    pub fn use_config(&mut self, config: Config) {
        self.loader = Box::new(StaticConfigLoader::new(config));
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
    }

    /// Registers the echo service a second time.
    pub fn duplicate_echo_service(&mut self) {
        self.services.push(Arc::new(EchoService));
    }

    pub fn bootstrap(&mut self) {
        let services = std::mem::take(&mut self.services);
        match bootstrap_with(&*self.loader, self.reporter.clone(), services) {
            Ok(daemon) => self.daemon = Some(daemon),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Feeds `input` to the daemon and captures everything it writes.
    pub fn serve(&mut self, input: &str) {
        let daemon = self.daemon.as_ref().expect("daemon should be bootstrapped");
        let mut written = Vec::new();
        let outcome = daemon
            .serve(Cursor::new(input.as_bytes()), &mut written)
            .map(|_| String::from_utf8(written).expect("responses are UTF-8"));
        self.output = Some(outcome);
    }

    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    pub fn registry(&self) -> &ActionRegistry {
        self.daemon
            .as_ref()
            .expect("daemon should be bootstrapped")
            .registry()
    }

    /// Response lines written by the last session.
    pub fn response_lines(&self) -> Vec<String> {
        match self.output.as_ref().expect("a session should have run") {
            Ok(text) => text.lines().map(str::to_owned).collect(),
            Err(error) => panic!("session failed: {error}"),
        }
    }
}

/// Loader that fails by passing an unparsable flag value.
struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("remote-actiond"),
            OsString::from("--max-request-bytes"),
            OsString::from("lots"),
        ];
        Config::load_from_iter(args)
    }
}

/// Records health events for assertions.
#[derive(Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config, registry: &ActionRegistry) {
        self.record(HealthEvent::BootstrapSucceeded {
            actions: registry.len(),
        });
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn session_finished(&self, summary: &ServeSummary) {
        self.record(HealthEvent::SessionFinished(*summary));
    }

    fn session_failed(&self, error: &ServerError) {
        self.record(HealthEvent::SessionFailed(error.to_string()));
    }
}

/// Lifecycle events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded { actions: usize },
    BootstrapFailed(String),
    SessionFinished(ServeSummary),
    SessionFailed(String),
}
