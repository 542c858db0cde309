//! Crate-level integration and BDD tests.

use std::sync::Arc;

use serde_json::json;

use crate::error::ActionError;
use crate::registry::{ActionRegistry, RemoteService};
use crate::{Dispatcher, remote_service};


/// Service used across the behaviour tests.
pub(super) struct EchoService;

#[remote_service]
impl EchoService {
    #[remote_action(name = "say", parameters("msg"))]
    fn echo(&self, msg: String) -> Result<String, ActionError> {
        Ok(msg)
    }

    #[remote_action]
    fn ping() -> Result<&'static str, ActionError> {
        Ok("pong")
    }
}

pub(super) fn echo_service() -> Arc<dyn RemoteService> {
    Arc::new(EchoService)
}

struct Counter {
    step: i64,
}

#[remote_service]
impl Counter {
    #[remote_action(parameters = ["value", "times"])]
    fn scale(&self, value: i64, times: Option<i64>) -> Result<i64, ActionError> {
        value
            .checked_mul(times.unwrap_or(self.step))
            .ok_or_else(|| ActionError::with_code(10, "overflow"))
    }
}

#[test]
fn generated_service_dispatches_end_to_end() {
    let registry =
        ActionRegistry::build([echo_service(), Arc::new(Counter { step: 2 }) as Arc<dyn RemoteService>])
            .expect("registry builds");
    let dispatcher = Dispatcher::new(&registry);

    let default_times = dispatcher
        .handle_payload(br#"{"jsonrpc":"2.0","method":"scale","params":{"value":21},"id":1}"#)
        .expect("response");
    assert_eq!(
        default_times.responses().first().and_then(|response| response.result()),
        Some(&json!(42))
    );

    let overflow = dispatcher
        .handle_payload(br#"{"jsonrpc":"2.0","method":"scale","params":[9223372036854775807, 2],"id":2}"#)
        .expect("response");
    assert_eq!(
        overflow
            .responses()
            .first()
            .and_then(|response| response.error())
            .map(crate::ErrorObject::code),
        Some(10)
    );
}

#[test]
fn generated_marker_options_reach_the_descriptor() {
    let registry = ActionRegistry::build([echo_service()]).expect("registry builds");
    let say = registry.lookup("say").expect("say registered");
    assert_eq!(say.declared_name(), "echo");
    assert_eq!(say.parameter_names(), ["msg".to_owned()]);

    let ping = registry.lookup("ping").expect("ping registered");
    assert_eq!(ping.arity(), 0);
    assert!(registry.lookup("echo").is_none());
}
