//! Error types for registry construction, parameter binding and dispatch.
//!
//! Build-time failures ([`ConfigError`]) abort registry construction and must
//! surface before any request is served. Per-request failures
//! ([`DispatchError`]) are always converted into a JSON-RPC error object and
//! never escape the dispatcher. Callables report their own failures through
//! [`ActionError`].

use serde_json::Value;
use thiserror::Error;

use crate::binder::{ParamKind, ValueKind};
use crate::protocol::ErrorObject;

/// Numeric JSON-RPC 2.0 error codes emitted by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Payload was not valid JSON.
    ParseError,
    /// Payload was JSON but not a valid request object.
    InvalidRequest,
    /// No action is registered under the requested method name.
    MethodNotFound,
    /// Request parameters could not be bound to the action's signature.
    InvalidParams,
    /// The action failed or panicked while running.
    InternalError,
    /// The invocation limit fired before the action completed.
    Timeout,
}

impl ErrorCode {
    /// Returns the wire value of the code.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::Timeout => -32000,
        }
    }

    /// Maps a wire value back onto a known code.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            -32700 => Some(Self::ParseError),
            -32600 => Some(Self::InvalidRequest),
            -32601 => Some(Self::MethodNotFound),
            -32602 => Some(Self::InvalidParams),
            -32603 => Some(Self::InternalError),
            -32000 => Some(Self::Timeout),
            _ => None,
        }
    }
}

/// Fatal configuration errors raised while building an action registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two definitions resolved to the same exposed name.
    #[error("duplicate action name '{name}': declared by '{first}' and '{second}'")]
    DuplicateActionName {
        /// Exposed name both definitions resolved to.
        name: String,
        /// Declared identifier of the definition registered first.
        first: String,
        /// Declared identifier of the conflicting definition.
        second: String,
    },

    /// The declared parameter names do not describe the callable.
    #[error("invalid parameter names for action '{action}': {message}")]
    InvalidParameterSpec {
        /// Exposed name of the offending action.
        action: String,
        /// Description of the mismatch.
        message: String,
    },

    /// Neither an override nor a declared identifier provided a name.
    #[error("action declared as '{declared}' resolves to an empty name")]
    EmptyActionName {
        /// Declared identifier of the offending definition.
        declared: String,
    },

    /// The exposed name uses the `rpc.` prefix reserved by JSON-RPC 2.0.
    #[error("action name '{name}' uses the reserved 'rpc.' prefix")]
    ReservedActionName {
        /// Offending exposed name.
        name: String,
    },
}

impl ConfigError {
    /// Creates a duplicate action name error.
    pub fn duplicate(
        name: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::DuplicateActionName {
            name: name.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Creates an invalid parameter specification error.
    pub fn invalid_parameters(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameterSpec {
            action: action.into(),
            message: message.into(),
        }
    }
}

/// Reasons a params value could not be bound to an action's signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// Positional params (or absent params) do not match the arity.
    #[error("expected {expected} parameter(s), got {actual}")]
    ArityMismatch {
        /// Arity of the callable.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// A declared parameter is absent from named params.
    #[error("missing parameter: {name}")]
    MissingParameter {
        /// Name of the missing parameter.
        name: String,
    },

    /// A supplied value is not compatible with the parameter type.
    #[error(
        "type mismatch for parameter '{parameter}': expected {expected}, got {actual}{}",
        render_detail(.detail)
    )]
    TypeMismatch {
        /// Declared name, or `#<index>` for positional-only actions.
        parameter: String,
        /// Kind the parameter type accepts.
        expected: ParamKind,
        /// Kind of the supplied value.
        actual: ValueKind,
        /// Extra decoder context (range overflow, nested field errors).
        detail: Option<String>,
    },

    /// Named params were sent to an action without declared parameter names.
    #[error("action '{action}' declares no parameter names and cannot bind named params")]
    UnresolvableNamedBinding {
        /// Exposed name of the action.
        action: String,
    },
}

fn render_detail(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map_or_else(String::new, |text| format!(" ({text})"))
}

/// Failure reported by a callable.
///
/// The default code is `InternalError`; actions that distinguish their own
/// failure kinds attach an application-defined code with
/// [`ActionError::with_code`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ActionError {
    code: i64,
    message: String,
    data: Option<Value>,
}

impl ActionError {
    /// Creates an internal error with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::InternalError.code(), message)
    }

    /// Creates an error carrying an application-defined code.
    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured data to the error.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> i64 {
        self.code
    }

    /// Returns the error message.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns the attached data, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}

/// Per-request failures. Each variant maps onto one JSON-RPC error code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// Payload could not be parsed as JSON.
    #[error("parse error: {message}")]
    Parse {
        /// Parser diagnostic.
        message: String,
    },

    /// Payload is JSON but does not describe a request.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Description of the structural problem.
        message: String,
    },

    /// No action is registered under the method name.
    #[error("method not found: {method}")]
    MethodNotFound {
        /// Requested method name.
        method: String,
    },

    /// Params could not be bound.
    #[error("{0}")]
    InvalidParams(#[from] BindError),

    /// The callable returned an error.
    #[error("{0}")]
    Action(#[from] ActionError),

    /// The callable panicked.
    #[error("action panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
    },

    /// The invocation timeout elapsed before the callable completed.
    #[error("request timed out after {millis} ms")]
    TimedOut {
        /// Configured timeout in milliseconds.
        millis: u128,
    },

    /// The caller cancelled the invocation before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// Dispatcher-side failure unrelated to the callable's own logic.
    #[error("internal error: {message}")]
    Internal {
        /// Failure description.
        message: String,
    },
}

impl DispatchError {
    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a method not found error.
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::MethodNotFound {
            method: method.into(),
        }
    }

    /// Creates a panic error.
    pub fn panicked(message: impl Into<String>) -> Self {
        Self::Panicked {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the JSON-RPC code reported for this error.
    #[must_use]
    pub fn code(&self) -> i64 {
        match self {
            Self::Parse { .. } => ErrorCode::ParseError.code(),
            Self::InvalidRequest { .. } => ErrorCode::InvalidRequest.code(),
            Self::MethodNotFound { .. } => ErrorCode::MethodNotFound.code(),
            Self::InvalidParams(_) => ErrorCode::InvalidParams.code(),
            Self::Action(error) => error.code(),
            Self::TimedOut { .. } | Self::Cancelled => ErrorCode::Timeout.code(),
            Self::Panicked { .. } | Self::Internal { .. } => ErrorCode::InternalError.code(),
        }
    }

    /// Converts the error into the object carried by an error response.
    #[must_use]
    pub fn to_error_object(&self) -> ErrorObject {
        match self {
            Self::Action(error) => ErrorObject::new(error.code(), error.message())
                .with_optional_data(error.data().cloned()),
            other => ErrorObject::new(other.code(), other.to_string()),
        }
    }
}
