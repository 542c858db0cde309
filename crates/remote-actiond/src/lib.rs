//! Line-delimited JSON-RPC daemon for remote actions.
//!
//! The daemon reads one JSON-RPC payload per line from standard input and
//! writes one response line per payload that needs an answer to standard
//! output. Logs go to standard error.
//!
//! Bootstrap loads [`remote_action_config::Config`], validates it, installs
//! structured telemetry and builds the action registry from the supplied
//! services. A [`HealthReporter`] observes each stage, and
//! [`StructuredHealthReporter`] turns the stages into `tracing` events.

mod bootstrap;
mod health;
mod server;
mod services;
mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use server::{LineServer, ServeSummary, ServerError};
pub use services::{
    ArithmeticService, DIVISION_BY_ZERO, EchoService, OVERFLOW, Vector, default_services,
};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
