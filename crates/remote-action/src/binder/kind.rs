//! Per-kind decoder table used to coerce wire values into typed arguments.
//!
//! Every argument type implements [`ActionArg`], which names the
//! [`ParamKind`] it accepts and decodes a [`Value`] of that kind. Argument
//! types without an implementation are rejected when the handler is
//! registered, so unsupported combinations never reach the wire.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use strum::Display;

/// Kind of JSON value a parameter type accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ParamKind {
    /// `true` or `false`.
    Boolean,
    /// A number without a fractional part.
    Integer,
    /// Any number.
    Number,
    /// A string.
    String,
    /// An array.
    Array,
    /// An object.
    Object,
    /// An array or object decoded through `serde`.
    Structured,
    /// Any value, including `null`.
    Any,
}

impl ParamKind {
    /// Reports whether a value of `actual` kind may be decoded.
    #[must_use]
    pub const fn accepts(self, actual: ValueKind) -> bool {
        matches!(
            (self, actual),
            (Self::Any, _)
                | (Self::Boolean, ValueKind::Boolean)
                | (Self::Integer, ValueKind::Integer)
                | (Self::Number, ValueKind::Integer | ValueKind::Number)
                | (Self::String, ValueKind::String)
                | (Self::Array | Self::Structured, ValueKind::Array)
                | (Self::Object | Self::Structured, ValueKind::Object)
        )
    }
}

/// Kind of a JSON value received on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ValueKind {
    /// `null`.
    Null,
    /// `true` or `false`.
    Boolean,
    /// A number representable as `i64` or `u64`.
    Integer,
    /// A number with a fractional part or exponent.
    Number,
    /// A string.
    String,
    /// An array.
    Array,
    /// An object.
    Object,
}

impl ValueKind {
    /// Classifies a JSON value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(number) if number.is_i64() || number.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

/// Decoder failure before a parameter name is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// Kind the decoder accepts.
    pub expected: ParamKind,
    /// Kind of the offending value.
    pub actual: ValueKind,
    /// Extra context, such as the failing array index or a `serde` message.
    pub detail: Option<String>,
}

impl DecodeError {
    /// Creates a plain kind mismatch.
    #[must_use]
    pub const fn mismatch(expected: ParamKind, actual: ValueKind) -> Self {
        Self {
            expected,
            actual,
            detail: None,
        }
    }

    /// Attaches decoder context.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Argument types an action may declare.
///
/// `OPTIONAL` types accept `null` and may be omitted from named params.
pub trait ActionArg: Sized + Send + 'static {
    /// Kind of value the type decodes from.
    const KIND: ParamKind;
    /// Whether the parameter may be absent or `null`.
    const OPTIONAL: bool = false;

    /// Decodes a wire value.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the value's kind or content does not fit
    /// the type.
    fn decode(value: Value) -> Result<Self, DecodeError>;
}

/// Checks the kind, then decodes through `serde`.
fn decode_with_serde<T: DeserializeOwned>(kind: ParamKind, value: Value) -> Result<T, DecodeError> {
    let actual = ValueKind::of(&value);
    if !kind.accepts(actual) {
        return Err(DecodeError::mismatch(kind, actual));
    }
    serde_json::from_value(value)
        .map_err(|error| DecodeError::mismatch(kind, actual).with_detail(error.to_string()))
}

macro_rules! serde_backed_args {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl ActionArg for $ty {
                const KIND: ParamKind = $kind;

                fn decode(value: Value) -> Result<Self, DecodeError> {
                    decode_with_serde(Self::KIND, value)
                }
            }
        )+
    };
}

serde_backed_args!(ParamKind::Boolean => bool);
serde_backed_args!(ParamKind::Integer => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
serde_backed_args!(ParamKind::Number => f32, f64);
serde_backed_args!(ParamKind::String => String);

impl ActionArg for Value {
    const KIND: ParamKind = ParamKind::Any;

    fn decode(value: Value) -> Result<Self, DecodeError> {
        Ok(value)
    }
}

impl<T: ActionArg> ActionArg for Option<T> {
    const KIND: ParamKind = T::KIND;
    const OPTIONAL: bool = true;

    fn decode(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => T::decode(other).map(Some),
        }
    }
}

impl<T: ActionArg> ActionArg for Vec<T> {
    const KIND: ParamKind = ParamKind::Array;

    fn decode(value: Value) -> Result<Self, DecodeError> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(DecodeError::mismatch(Self::KIND, ValueKind::of(&other))),
        };
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                T::decode(item).map_err(|error| nest(error, format!("at index {index}")))
            })
            .collect()
    }
}

impl<T, S> ActionArg for HashMap<String, T, S>
where
    T: ActionArg,
    S: BuildHasher + Default + Send + 'static,
{
    const KIND: ParamKind = ParamKind::Object;

    fn decode(value: Value) -> Result<Self, DecodeError> {
        decode_entries(value).map(|entries| entries.into_iter().collect())
    }
}

impl<T: ActionArg> ActionArg for BTreeMap<String, T> {
    const KIND: ParamKind = ParamKind::Object;

    fn decode(value: Value) -> Result<Self, DecodeError> {
        decode_entries(value).map(|entries| entries.into_iter().collect())
    }
}

fn decode_entries<T: ActionArg>(value: Value) -> Result<Vec<(String, T)>, DecodeError> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(DecodeError::mismatch(
                ParamKind::Object,
                ValueKind::of(&other),
            ));
        }
    };
    map.into_iter()
        .map(|(key, item)| match T::decode(item) {
            Ok(decoded) => Ok((key, decoded)),
            Err(error) => Err(nest(error, format!("at key '{key}'"))),
        })
        .collect()
}

fn nest(error: DecodeError, location: String) -> DecodeError {
    let detail = match error.detail {
        Some(inner) => format!("{location}: {inner}"),
        None => location,
    };
    DecodeError {
        detail: Some(detail),
        ..error
    }
}

/// Wrapper for structured arguments decoded through `serde`.
///
/// ```rust
/// use remote_action::Json;
///
/// #[derive(serde::Deserialize)]
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// fn area(Json(point): Json<Point>) -> i64 {
///     point.x * point.y
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwraps the decoded value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> ActionArg for Json<T>
where
    T: DeserializeOwned + Send + 'static,
{
    const KIND: ParamKind = ParamKind::Structured;

    fn decode(value: Value) -> Result<Self, DecodeError> {
        decode_with_serde(Self::KIND, value).map(Json)
    }
}

/// A decoded argument with its concrete type erased.
pub struct BoundArg(Box<dyn Any + Send>);

impl BoundArg {
    fn new<T: Any + Send>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Recovers the concrete value.
    pub(crate) fn downcast<T: Any>(self) -> Option<T> {
        self.0.downcast::<T>().ok().map(|boxed| *boxed)
    }
}

impl fmt::Debug for BoundArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundArg").finish_non_exhaustive()
    }
}

type DecodeFn = fn(Value) -> Result<BoundArg, DecodeError>;

fn decode_erased<T: ActionArg>(value: Value) -> Result<BoundArg, DecodeError> {
    T::decode(value).map(BoundArg::new)
}

/// Signature entry for one formal parameter.
#[derive(Clone, Copy)]
pub struct ParamSpec {
    kind: ParamKind,
    optional: bool,
    decode: DecodeFn,
}

impl ParamSpec {
    /// Describes a parameter of type `T`.
    #[must_use]
    pub fn of<T: ActionArg>() -> Self {
        Self {
            kind: T::KIND,
            optional: T::OPTIONAL,
            decode: decode_erased::<T>,
        }
    }

    /// Kind of value the parameter accepts.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Whether the parameter may be omitted or `null`.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    pub(crate) fn decode(&self, value: Value) -> Result<BoundArg, DecodeError> {
        (self.decode)(value)
    }
}

impl fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamSpec")
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .finish_non_exhaustive()
    }
}
