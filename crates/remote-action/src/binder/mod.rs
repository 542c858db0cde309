//! Parameter binding from JSON-RPC params onto an action's signature.
//!
//! The params shape is resolved once into [`Params`]: positional values bind
//! by index, named values bind by the descriptor's declared parameter names,
//! and absent params bind only to zero-arity actions. Each value is then run
//! through the decoder for its parameter's [`ParamKind`]. Binding stops at the
//! first failing parameter.

mod kind;

use serde_json::{Map, Value};

use crate::action::ActionDescriptor;
use crate::callable::Arguments;
use crate::error::BindError;
use crate::protocol::Params;

pub use self::kind::{ActionArg, BoundArg, DecodeError, Json, ParamKind, ParamSpec, ValueKind};

/// Binds request params to the descriptor's callable.
///
/// Extra keys in named params are ignored.
///
/// # Errors
///
/// Returns [`BindError::ArityMismatch`] when positional or absent params do
/// not match the arity, [`BindError::MissingParameter`] when a required named
/// parameter is absent, [`BindError::UnresolvableNamedBinding`] when named
/// params reach an action without declared names, and
/// [`BindError::TypeMismatch`] when a value cannot be decoded.
pub fn bind(descriptor: &ActionDescriptor, params: Option<Params>) -> Result<Arguments, BindError> {
    let bound = match params {
        None => bind_absent(descriptor)?,
        Some(Params::Positional(values)) => bind_positional(descriptor, values)?,
        Some(Params::Named(entries)) => bind_named(descriptor, entries)?,
    };
    Ok(Arguments::new(bound))
}

fn bind_absent(descriptor: &ActionDescriptor) -> Result<Vec<BoundArg>, BindError> {
    match descriptor.arity() {
        0 => Ok(Vec::new()),
        expected => Err(BindError::ArityMismatch {
            expected,
            actual: 0,
        }),
    }
}

fn bind_positional(
    descriptor: &ActionDescriptor,
    values: Vec<Value>,
) -> Result<Vec<BoundArg>, BindError> {
    let specs = descriptor.callable().params();
    if values.len() != specs.len() {
        return Err(BindError::ArityMismatch {
            expected: specs.len(),
            actual: values.len(),
        });
    }

    specs
        .iter()
        .zip(values)
        .enumerate()
        .map(|(index, (spec, value))| decode(spec, value, || label(descriptor, index)))
        .collect()
}

fn bind_named(
    descriptor: &ActionDescriptor,
    mut entries: Map<String, Value>,
) -> Result<Vec<BoundArg>, BindError> {
    let names = descriptor.parameter_names();
    if names.is_empty() {
        return Err(BindError::UnresolvableNamedBinding {
            action: descriptor.name().to_owned(),
        });
    }

    let specs = descriptor.callable().params();
    names
        .iter()
        .zip(specs)
        .map(|(name, spec)| {
            let value = match entries.remove(name) {
                Some(value) => value,
                None if spec.is_optional() => Value::Null,
                None => return Err(BindError::MissingParameter { name: name.clone() }),
            };
            decode(spec, value, || name.clone())
        })
        .collect()
}

fn decode(
    spec: &ParamSpec,
    value: Value,
    parameter: impl FnOnce() -> String,
) -> Result<BoundArg, BindError> {
    spec.decode(value)
        .map_err(|error| BindError::TypeMismatch {
            parameter: parameter(),
            expected: error.expected,
            actual: error.actual,
            detail: error.detail,
        })
}

/// Names a positional parameter, preferring its declared name.
fn label(descriptor: &ActionDescriptor, index: usize) -> String {
    descriptor
        .parameter_names()
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("#{index}"))
}
