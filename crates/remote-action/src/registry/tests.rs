//! Unit tests for registry construction and lookup.

use rstest::{fixture, rstest};

use super::*;
use crate::error::ActionError;

struct Greeter {
    greeting: String,
}

impl Greeter {
    fn greet(&self, name: &str) -> String {
        format!("{}, {name}", self.greeting)
    }
}

impl RemoteService for Greeter {
    fn remote_actions(self: Arc<Self>) -> Vec<ActionDefinition> {
        let this = Arc::clone(&self);
        vec![
            ActionDefinition::new("greet", move |name: String| {
                Ok::<_, ActionError>(this.greet(&name))
            })
            .with_parameters(["name"]),
            ActionDefinition::new("version", || Ok::<_, ActionError>("1")),
        ]
    }
}

struct Clock;

impl RemoteService for Clock {
    fn remote_actions(self: Arc<Self>) -> Vec<ActionDefinition> {
        vec![ActionDefinition::new("now", || Ok::<_, ActionError>(0_u64)).with_name("time")]
    }
}

fn services() -> Vec<Arc<dyn RemoteService>> {
    vec![
        Arc::new(Greeter {
            greeting: "hello".into(),
        }),
        Arc::new(Clock),
    ]
}

#[fixture]
fn registry() -> ActionRegistry {
    ActionRegistry::build(services()).expect("registry builds")
}

#[test]
fn empty_build_yields_empty_registry() {
    let registry = ActionRegistry::build(Vec::new()).expect("empty registry");
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
}

#[rstest]
fn build_indexes_every_marked_action(registry: ActionRegistry) {
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.names(), vec!["greet", "time", "version"]);
}

#[rstest]
#[case::declared("greet", "greet")]
#[case::overridden("time", "now")]
fn lookup_returns_resolved_descriptor(
    registry: ActionRegistry,
    #[case] name: &str,
    #[case] declared: &str,
) {
    let descriptor = registry.lookup(name).expect("registered");
    assert_eq!(descriptor.name(), name);
    assert_eq!(descriptor.declared_name(), declared);
}

#[rstest]
fn lookup_misses_declared_name_behind_override(registry: ActionRegistry) {
    assert!(registry.lookup("now").is_none());
    assert!(registry.lookup("unknown").is_none());
}

#[test]
fn duplicate_names_across_services_abort_build() {
    let error = ActionRegistry::builder()
        .service(Arc::new(Clock))
        .action(ActionDefinition::new("clock", || Ok::<_, ActionError>(1_u64)).with_name("time"))
        .build()
        .expect_err("duplicate name");
    assert_eq!(error, ConfigError::duplicate("time", "now", "clock"));
}

#[test]
fn invalid_parameter_list_aborts_build() {
    let error = ActionRegistry::builder()
        .action(
            ActionDefinition::new("add", |a: i64, b: i64| Ok::<_, ActionError>(a.saturating_add(b)))
                .with_parameters(["a"]),
        )
        .build()
        .expect_err("count mismatch");
    assert!(matches!(error, ConfigError::InvalidParameterSpec { ref action, .. } if action == "add"));
}

#[test]
fn explicit_table_and_services_combine() {
    let registry = ActionRegistry::builder()
        .action(ActionDefinition::new("status", || Ok::<_, ActionError>("ok")))
        .service(Arc::new(Clock))
        .build()
        .expect("registry builds");
    assert_eq!(registry.names(), vec!["status", "time"]);
}

#[test]
fn registry_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ActionRegistry>();
}
