//! Behavioural tests for daemon bootstrap and serving.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;

use remote_action_config::Config;

use crate::bootstrap::BootstrapError;
use crate::server::ServeSummary;

use super::support::{HealthEvent, TestWorld};

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'')
}

#[given("a default configuration")]
fn given_default_configuration(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_config(Config::default());
}

#[given("a configuration with a zero invoke timeout")]
fn given_zero_timeout(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_config(Config {
        invoke_timeout_ms: Some(0),
        ..Config::default()
    });
}

#[given("a configuration limiting requests to {limit} bytes")]
fn given_request_limit(world: &RefCell<TestWorld>, limit: usize) {
    world.borrow_mut().use_config(Config {
        max_request_bytes: limit,
        ..Config::default()
    });
}

#[given("a failing configuration loader")]
fn given_failing_loader(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_failing_loader();
}

#[given("the echo service is registered twice")]
fn given_duplicate_service(world: &RefCell<TestWorld>) {
    world.borrow_mut().duplicate_echo_service();
}

#[when("the daemon bootstrap runs")]
fn when_bootstrap_runs(world: &RefCell<TestWorld>) {
    world.borrow_mut().bootstrap();
}

#[when("the daemon serves the line {line}")]
fn when_serves_line(world: &RefCell<TestWorld>, line: String) {
    world
        .borrow_mut()
        .serve(&format!("{}\n", strip_quotes(&line)));
}

#[when("the daemon serves a {size} byte say request")]
fn when_serves_large_request(world: &RefCell<TestWorld>, size: usize) {
    let envelope = r#"{"jsonrpc":"2.0","method":"say","params":[""],"id":1}"#;
    let padding = "x".repeat(size.saturating_sub(envelope.len() + 1));
    let line = format!(r#"{{"jsonrpc":"2.0","method":"say","params":["{padding}"],"id":1}}"#);
    world.borrow_mut().serve(&format!("{line}\n"));
}

#[then("bootstrap succeeds with {count} actions")]
fn then_bootstrap_succeeds(world: &RefCell<TestWorld>, count: usize) {
    let w = world.borrow();
    assert!(
        w.bootstrap_error().is_none(),
        "bootstrap error: {:?}",
        w.bootstrap_error()
    );
    assert_eq!(w.registry().len(), count);
    assert!(
        w.reporter
            .events()
            .contains(&HealthEvent::BootstrapSucceeded { actions: count }),
        "bootstrap success event missing"
    );
}

#[then("bootstrap fails with a {stage} error")]
fn then_bootstrap_fails(world: &RefCell<TestWorld>, stage: String) {
    let w = world.borrow();
    let error = w.bootstrap_error().expect("bootstrap should fail");
    let matched = match strip_quotes(&stage) {
        "configuration" => matches!(error, BootstrapError::Configuration { .. }),
        "validation" => matches!(error, BootstrapError::Validation { .. }),
        "registry" => matches!(error, BootstrapError::Registry { .. }),
        other => panic!("unknown bootstrap stage '{other}'"),
    };
    assert!(matched, "unexpected error: {error}");
    let events = w.reporter.events();
    assert_eq!(events.first(), Some(&HealthEvent::BootstrapStarting));
    assert!(
        events
            .iter()
            .any(|event| matches!(event, HealthEvent::BootstrapFailed(_))),
        "bootstrap failure event missing: {events:?}"
    );
}

#[then("the daemon writes the response {expected}")]
fn then_daemon_writes(world: &RefCell<TestWorld>, expected: String) {
    let lines = world.borrow().response_lines();
    let actual: Vec<Value> = lines
        .iter()
        .map(|line| serde_json::from_str(line).expect("response line is JSON"))
        .collect();
    let expected: Value =
        serde_json::from_str(strip_quotes(&expected)).expect("expected response is JSON");
    assert_eq!(actual, [expected]);
}

#[then("the daemon writes nothing")]
fn then_daemon_writes_nothing(world: &RefCell<TestWorld>) {
    assert!(world.borrow().response_lines().is_empty());
}

#[then("the daemon rejects the request as too large")]
fn then_rejects_large(world: &RefCell<TestWorld>) {
    let lines = world.borrow().response_lines();
    let [line] = lines.as_slice() else {
        panic!("expected one response line, got {lines:?}");
    };
    let response: Value = serde_json::from_str(line).expect("response line is JSON");
    assert_eq!(response["error"]["code"], Value::from(-32600));
    let message = response["error"]["message"]
        .as_str()
        .expect("error message is a string");
    assert!(message.starts_with("request too large"), "{message}");
}

#[then("the session reported {payloads} payloads and {responses} responses")]
fn then_session_reported(world: &RefCell<TestWorld>, payloads: usize, responses: usize) {
    let summary = ServeSummary {
        payloads,
        responses,
    };
    assert!(
        world
            .borrow()
            .reporter
            .events()
            .contains(&HealthEvent::SessionFinished(summary)),
        "session summary missing"
    );
}

#[scenario(
    path = "tests/features/daemon.feature",
    name = "Bootstrap registers the default services"
)]
fn bootstrap_registers_defaults(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon.feature",
    name = "Bootstrap reports configuration failures"
)]
fn bootstrap_reports_configuration_failures(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon.feature",
    name = "Bootstrap rejects unusable settings"
)]
fn bootstrap_rejects_unusable_settings(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon.feature",
    name = "Bootstrap rejects conflicting action names"
)]
fn bootstrap_rejects_conflicts(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon.feature",
    name = "A request line is answered on one output line"
)]
fn request_line_answered(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon.feature",
    name = "A notification line produces no output"
)]
fn notification_line_silent(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon.feature",
    name = "Oversized request lines are rejected"
)]
fn oversized_lines_rejected(world: RefCell<TestWorld>) {
    drop(world);
}
