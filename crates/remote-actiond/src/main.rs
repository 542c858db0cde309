//! Entry point for the remote action daemon.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::sync::Arc;

use remote_actiond::{StructuredHealthReporter, SystemConfigLoader, bootstrap_with, default_services};

fn main() -> ExitCode {
    let reporter = Arc::new(StructuredHealthReporter::new());
    let daemon = match bootstrap_with(&SystemConfigLoader, reporter, default_services()) {
        Ok(daemon) => daemon,
        Err(error) => {
            // Telemetry may not be installed yet, so report directly.
            writeln!(io::stderr(), "remote-actiond: {error}").ok();
            return ExitCode::FAILURE;
        }
    };

    let stdout = BufWriter::new(io::stdout().lock());
    match daemon.serve(io::stdin().lock(), stdout) {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
