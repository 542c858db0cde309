//! JSON-RPC 2.0 request and response envelopes.
//!
//! The types serialise to and from the standard wire objects. A request
//! without an `id` member is a notification; an explicit `"id": null` is a
//! correlated request whose response echoes `null`.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Protocol version marker, always `"2.0"` on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Version;

impl Version {
    /// Wire value of the supported protocol version.
    pub const WIRE: &'static str = "2.0";
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(Self::WIRE)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text == Self::WIRE {
            Ok(Self)
        } else {
            Err(de::Error::custom(format!(
                "unsupported jsonrpc version '{text}', expected '{}'",
                Self::WIRE
            )))
        }
    }
}

/// Request correlation token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// Numeric id, kept as written so any integer echoes back unchanged.
    Number(Number),
    /// String id.
    String(String),
    /// Explicit `null` id.
    Null,
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Request params, resolved once into their shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    /// Values bound by position.
    Positional(Vec<Value>),
    /// Values bound by declared parameter name.
    Named(Map<String, Value>),
}

impl Params {
    /// Classifies a JSON value as params.
    ///
    /// Returns `None` for values that are neither arrays nor objects.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(values) => Some(Self::Positional(values)),
            Value::Object(entries) => Some(Self::Named(entries)),
            _ => None,
        }
    }

    /// Number of supplied values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Positional(values) => values.len(),
            Self::Named(entries) => entries.len(),
        }
    }

    /// Returns `true` when no values were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Self::Positional(values)
    }
}

impl From<Map<String, Value>> for Params {
    fn from(entries: Map<String, Value>) -> Self {
        Self::Named(entries)
    }
}

/// A decoded JSON-RPC request or notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    jsonrpc: Version,
    method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    params: Option<Params>,
    #[serde(
        default,
        deserialize_with = "deserialize_present_id",
        skip_serializing_if = "Option::is_none"
    )]
    id: Option<Id>,
}

/// Maps a present `id` member, including `null`, to `Some`.
fn deserialize_present_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Id>, D::Error> {
    Id::deserialize(deserializer).map(Some)
}

impl Request {
    /// Creates a correlated request.
    pub fn new(method: impl Into<String>, params: Option<Params>, id: impl Into<Id>) -> Self {
        Self {
            jsonrpc: Version,
            method: method.into(),
            params,
            id: Some(id.into()),
        }
    }

    /// Creates a notification.
    pub fn notification(method: impl Into<String>, params: Option<Params>) -> Self {
        Self {
            jsonrpc: Version,
            method: method.into(),
            params,
            id: None,
        }
    }

    /// Requested method name.
    #[must_use]
    pub const fn method(&self) -> &str {
        self.method.as_str()
    }

    /// Request params, if any.
    #[must_use]
    pub const fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// Correlation id; `None` for notifications.
    #[must_use]
    pub const fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    /// Returns `true` when no response must be produced.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Splits the request into method, params and id.
    #[must_use]
    pub fn into_parts(self) -> (String, Option<Params>, Option<Id>) {
        (self.method, self.params, self.id)
    }
}

/// Error member of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    code: i64,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl ErrorObject {
    /// Creates an error object without data.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches data when present.
    #[must_use]
    pub fn with_optional_data(mut self, data: Option<Value>) -> Self {
        self.data = data;
        self
    }

    /// Error code.
    #[must_use]
    pub const fn code(&self) -> i64 {
        self.code
    }

    /// Error message.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Structured data, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}

/// Outcome member of a response: exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    /// Successful return value.
    Result(Value),
    /// Failure description.
    Error(ErrorObject),
}

/// A JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    jsonrpc: Version,
    id: Id,
    #[serde(flatten)]
    payload: Payload,
}

impl Response {
    /// Creates a success response.
    #[must_use]
    pub const fn success(id: Id, result: Value) -> Self {
        Self {
            jsonrpc: Version,
            id,
            payload: Payload::Result(result),
        }
    }

    /// Creates an error response.
    #[must_use]
    pub const fn failure(id: Id, error: ErrorObject) -> Self {
        Self {
            jsonrpc: Version,
            id,
            payload: Payload::Error(error),
        }
    }

    /// Correlation id copied from the request.
    #[must_use]
    pub const fn id(&self) -> &Id {
        &self.id
    }

    /// Result or error member.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns the result value on success.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Result(value) => Some(value),
            Payload::Error(_) => None,
        }
    }

    /// Returns the error object on failure.
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorObject> {
        match &self.payload {
            Payload::Result(_) => None,
            Payload::Error(error) => Some(error),
        }
    }

    /// Returns `true` for success responses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.payload, Payload::Result(_))
    }
}

#[cfg(test)]
mod tests;
