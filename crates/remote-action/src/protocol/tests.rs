//! Unit tests for request and response envelopes.

use rstest::rstest;
use serde_json::json;

use super::*;

#[rstest]
#[case::absent_id(json!({"jsonrpc": "2.0", "method": "ping"}), None)]
#[case::null_id(json!({"jsonrpc": "2.0", "method": "ping", "id": null}), Some(Id::Null))]
#[case::numeric_id(json!({"jsonrpc": "2.0", "method": "ping", "id": 7}), Some(Id::from(7_i64)))]
#[case::id_above_i64(
    json!({"jsonrpc": "2.0", "method": "ping", "id": u64::MAX}),
    Some(Id::from(u64::MAX))
)]
#[case::string_id(
    json!({"jsonrpc": "2.0", "method": "ping", "id": "a"}),
    Some(Id::String("a".into()))
)]
fn id_presence_is_preserved(#[case] raw: Value, #[case] expected: Option<Id>) {
    let request: Request = serde_json::from_value(raw).expect("valid request");
    assert_eq!(request.id(), expected.as_ref());
    assert_eq!(request.is_notification(), expected.is_none());
}

#[test]
fn params_shape_is_classified() {
    let positional: Request =
        serde_json::from_value(json!({"jsonrpc": "2.0", "method": "add", "params": [1, 2], "id": 1}))
            .expect("positional");
    assert!(matches!(positional.params(), Some(Params::Positional(values)) if values.len() == 2));

    let named: Request = serde_json::from_value(
        json!({"jsonrpc": "2.0", "method": "say", "params": {"msg": "hi"}, "id": 1}),
    )
    .expect("named");
    assert!(matches!(named.params(), Some(Params::Named(entries)) if entries.contains_key("msg")));
}

#[rstest]
#[case::wrong_version(json!({"jsonrpc": "1.0", "method": "ping", "id": 1}))]
#[case::missing_version(json!({"method": "ping", "id": 1}))]
#[case::scalar_params(json!({"jsonrpc": "2.0", "method": "ping", "params": 3, "id": 1}))]
#[case::numeric_method(json!({"jsonrpc": "2.0", "method": 5, "id": 1}))]
#[case::fractional_id(json!({"jsonrpc": "2.0", "method": "ping", "id": 1.5}))]
fn rejects_malformed_requests(#[case] raw: Value) {
    assert!(serde_json::from_value::<Request>(raw).is_err());
}

#[test]
fn notification_serialises_without_id() {
    let request = Request::notification("log", None);
    let value = serde_json::to_value(&request).expect("serialise");
    assert_eq!(value, json!({"jsonrpc": "2.0", "method": "log"}));
}

#[test]
fn success_response_has_result_only() {
    let response = Response::success(Id::from(1_i64), json!("hi"));
    let value = serde_json::to_value(&response).expect("serialise");
    assert_eq!(value, json!({"jsonrpc": "2.0", "id": 1, "result": "hi"}));
}

#[test]
fn error_response_omits_absent_data() {
    let response = Response::failure(Id::Null, ErrorObject::new(-32700, "parse error"));
    let value = serde_json::to_value(&response).expect("serialise");
    assert_eq!(
        value,
        json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {"code": -32700, "message": "parse error"}
        })
    );
}

#[test]
fn error_response_round_trips_data() {
    let response = Response::failure(
        Id::from("req-1"),
        ErrorObject::new(1, "division by zero").with_optional_data(Some(json!({"lhs": 4}))),
    );
    let text = serde_json::to_string(&response).expect("serialise");
    let parsed: Response = serde_json::from_str(&text).expect("deserialise");
    assert_eq!(parsed, response);
    assert_eq!(
        parsed.error().and_then(ErrorObject::data),
        Some(&json!({"lhs": 4}))
    );
    assert!(parsed.result().is_none());
}

#[test]
fn params_from_value_rejects_scalars() {
    assert!(Params::from_value(json!("text")).is_none());
    assert_eq!(
        Params::from_value(json!([])).map(|params| params.is_empty()),
        Some(true)
    );
}

#[test]
fn large_integer_id_serialises_unchanged() {
    let request: Request = serde_json::from_str(
        r#"{"jsonrpc":"2.0","method":"ping","id":18446744073709551615}"#,
    )
    .expect("unsigned id is valid");
    let id = request.id().cloned().expect("id is present");
    let response = Response::success(id, json!("pong"));
    assert_eq!(
        serde_json::to_value(&response).expect("serialise"),
        json!({"jsonrpc": "2.0", "id": 18_446_744_073_709_551_615_u64, "result": "pong"})
    );
}
