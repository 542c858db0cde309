//! Actions served by the daemon out of the box.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::json;

use remote_action::{ActionError, Json, RemoteService, remote_service};

/// Application error code for integer overflow.
pub const OVERFLOW: i64 = 1001;

/// Application error code for division by zero.
pub const DIVISION_BY_ZERO: i64 = 1002;

/// Echo and liveness actions.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoService;

#[remote_service]
impl EchoService {
    /// Returns the message unchanged.
    #[remote_action(name = "say", parameters("msg"))]
    fn echo(&self, msg: String) -> Result<String, ActionError> {
        Ok(msg)
    }

    /// Liveness probe.
    #[remote_action]
    fn ping() -> Result<&'static str, ActionError> {
        Ok("pong")
    }
}

/// A two-dimensional integer vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Vector {
    /// Horizontal component.
    pub x: i64,
    /// Vertical component.
    pub y: i64,
}

/// Checked integer arithmetic.
#[derive(Debug, Default)]
pub struct ArithmeticService {
    calls: AtomicU64,
}

#[remote_service]
impl ArithmeticService {
    #[remote_action(parameters("lhs", "rhs"))]
    fn add(&self, lhs: i64, rhs: i64) -> Result<i64, ActionError> {
        self.record();
        lhs.checked_add(rhs)
            .ok_or_else(|| overflow("add", &[lhs, rhs]))
    }

    #[remote_action(parameters("dividend", "divisor"))]
    fn divide(&self, dividend: i64, divisor: i64) -> Result<i64, ActionError> {
        self.record();
        if divisor == 0 {
            return Err(ActionError::with_code(DIVISION_BY_ZERO, "division by zero")
                .with_data(json!({ "dividend": dividend })));
        }
        dividend
            .checked_div(divisor)
            .ok_or_else(|| overflow("divide", &[dividend, divisor]))
    }

    #[remote_action(name = "sum", parameters("values"))]
    fn sum_all(&self, values: Vec<i64>) -> Result<i64, ActionError> {
        self.record();
        values
            .iter()
            .try_fold(0_i64, |total, value| total.checked_add(*value))
            .ok_or_else(|| overflow("sum", &values))
    }

    #[remote_action(parameters("vector", "factor"))]
    fn scale(&self, vector: Json<Vector>, factor: i64) -> Result<Vector, ActionError> {
        self.record();
        let Json(Vector { x, y }) = vector;
        match (x.checked_mul(factor), y.checked_mul(factor)) {
            (Some(x_scaled), Some(y_scaled)) => Ok(Vector {
                x: x_scaled,
                y: y_scaled,
            }),
            _ => Err(overflow("scale", &[x, y, factor])),
        }
    }

    /// Number of arithmetic calls served so far.
    #[remote_action(name = "calls")]
    fn call_count(&self) -> Result<u64, ActionError> {
        Ok(self.calls.load(Ordering::Relaxed))
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

fn overflow(operation: &str, operands: &[i64]) -> ActionError {
    ActionError::with_code(OVERFLOW, format!("{operation} overflowed"))
        .with_data(json!({ "operands": operands }))
}

/// Services registered by the daemon binary.
#[must_use]
pub fn default_services() -> Vec<Arc<dyn RemoteService>> {
    vec![
        Arc::new(EchoService),
        Arc::new(ArithmeticService::default()),
    ]
}

#[cfg(test)]
mod tests {
    use remote_action::{ActionRegistry, Dispatcher, Params, Request};
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    use super::*;

    #[fixture]
    fn registry() -> ActionRegistry {
        ActionRegistry::build(default_services()).expect("default services register")
    }

    fn call(registry: &ActionRegistry, method: &str, params: Value) -> Result<Value, (i64, String)> {
        let params = Params::from_value(params).expect("params are structured");
        let response = Dispatcher::new(registry)
            .dispatch(Request::new(method, Some(params), 1_i64))
            .expect("request carries an id");
        match response.error() {
            Some(error) => Err((error.code(), error.message().to_owned())),
            None => Ok(response.result().cloned().expect("success carries a result")),
        }
    }

    #[rstest]
    fn default_services_expose_every_action(registry: ActionRegistry) {
        assert_eq!(
            registry.names(),
            ["add", "calls", "divide", "ping", "say", "scale", "sum"]
        );
    }

    #[rstest]
    #[case::add("add", json!([2, 3]), json!(5))]
    #[case::add_named("add", json!({"rhs": 3, "lhs": 2}), json!(5))]
    #[case::divide("divide", json!({"dividend": 9, "divisor": 2}), json!(4))]
    #[case::sum("sum", json!([[1, 2, 3]]), json!(6))]
    #[case::scale("scale", json!({"vector": {"x": 1, "y": -2}, "factor": 3}), json!({"x": 3, "y": -6}))]
    #[case::say("say", json!({"msg": "hi"}), json!("hi"))]
    #[case::ping("ping", json!([]), json!("pong"))]
    fn actions_compute_results(
        registry: ActionRegistry,
        #[case] method: &str,
        #[case] params: Value,
        #[case] expected: Value,
    ) {
        assert_eq!(call(&registry, method, params), Ok(expected));
    }

    #[rstest]
    #[case::add_overflow("add", json!([i64::MAX, 1]), OVERFLOW)]
    #[case::divide_by_zero("divide", json!([1, 0]), DIVISION_BY_ZERO)]
    #[case::divide_overflow("divide", json!([i64::MIN, -1]), OVERFLOW)]
    #[case::sum_overflow("sum", json!([[i64::MAX, 1]]), OVERFLOW)]
    fn arithmetic_failures_use_application_codes(
        registry: ActionRegistry,
        #[case] method: &str,
        #[case] params: Value,
        #[case] code: i64,
    ) {
        let (actual, _) = call(&registry, method, params).expect_err("call should fail");
        assert_eq!(actual, code);
    }

    #[rstest]
    fn call_counter_tracks_arithmetic_calls(registry: ActionRegistry) {
        call(&registry, "add", json!([1, 1])).expect("add succeeds");
        call(&registry, "divide", json!([1, 0])).expect_err("divide fails");
        assert_eq!(call(&registry, "calls", json!([])), Ok(json!(2)));
    }
}
