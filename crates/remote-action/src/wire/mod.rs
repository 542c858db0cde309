//! Decoding of raw JSON-RPC payloads, including batches.
//!
//! A payload is either a single request object or an array of them. Payloads
//! that are not JSON are answered with a parse error; JSON that does not
//! describe a request is answered with an invalid request error carrying the
//! request id when one can be recovered.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::dispatch::{DISPATCH_TARGET, Dispatcher, InvokeLimits};
use crate::error::DispatchError;
use crate::protocol::{Id, Request, Response};

/// A parsed payload before per-request validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// One request value.
    Single(Value),
    /// A batch of request values.
    Batch(Vec<Value>),
}

impl Incoming {
    /// Parses raw payload bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Parse`] when the payload is not valid JSON.
    pub fn parse(payload: &[u8]) -> Result<Self, DispatchError> {
        let value: Value = serde_json::from_slice(payload.trim_ascii_end())
            .map_err(|error| DispatchError::parse(error.to_string()))?;
        Ok(match value {
            Value::Array(items) => Self::Batch(items),
            other => Self::Single(other),
        })
    }
}

/// Responses produced for one payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outgoing {
    /// Response to a single request.
    Single(Response),
    /// Responses to the correlated members of a batch.
    Batch(Vec<Response>),
}

impl Outgoing {
    /// Responses in output order.
    #[must_use]
    pub fn responses(&self) -> &[Response] {
        match self {
            Self::Single(response) => std::slice::from_ref(response),
            Self::Batch(responses) => responses,
        }
    }
}

/// Validates one request value.
///
/// # Errors
///
/// Returns the id to answer with and a [`DispatchError::InvalidRequest`]
/// describing why the value is not a request.
pub fn decode_request(value: Value) -> Result<Request, (Id, DispatchError)> {
    if !value.is_object() {
        return Err((
            Id::Null,
            DispatchError::invalid_request("request must be a JSON object"),
        ));
    }
    let id = recover_id(&value);
    serde_json::from_value(value)
        .map_err(|error| (id, DispatchError::invalid_request(error.to_string())))
}

fn recover_id(value: &Value) -> Id {
    value
        .get("id")
        .cloned()
        .and_then(|raw| serde_json::from_value(raw).ok())
        .unwrap_or(Id::Null)
}

fn error_response(id: Id, error: &DispatchError) -> Response {
    debug!(target: DISPATCH_TARGET, %error, "rejected payload");
    Response::failure(id, error.to_error_object())
}

impl Dispatcher<'_> {
    /// Handles one raw payload with the dispatcher's default limits.
    ///
    /// Returns `None` when nothing must be written back: a notification, or a
    /// batch made only of notifications.
    #[must_use]
    pub fn handle_payload(&self, payload: &[u8]) -> Option<Outgoing> {
        self.handle_payload_with(payload, self.limits())
    }

    /// Handles one raw payload under caller-supplied limits.
    #[must_use]
    pub fn handle_payload_with(&self, payload: &[u8], limits: &InvokeLimits) -> Option<Outgoing> {
        match Incoming::parse(payload) {
            Err(error) => Some(Outgoing::Single(error_response(Id::Null, &error))),
            Ok(Incoming::Single(value)) => self.handle_value(value, limits).map(Outgoing::Single),
            Ok(Incoming::Batch(items)) if items.is_empty() => Some(Outgoing::Single(
                error_response(Id::Null, &DispatchError::invalid_request("empty batch")),
            )),
            Ok(Incoming::Batch(items)) => {
                let responses: Vec<Response> = items
                    .into_iter()
                    .filter_map(|item| self.handle_value(item, limits))
                    .collect();
                (!responses.is_empty()).then_some(Outgoing::Batch(responses))
            }
        }
    }

    fn handle_value(&self, value: Value, limits: &InvokeLimits) -> Option<Response> {
        match decode_request(value) {
            Ok(request) => self.dispatch_with(request, limits),
            Err((id, error)) => Some(error_response(id, &error)),
        }
    }
}
