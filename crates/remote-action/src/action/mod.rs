//! Remote action markers, definitions and resolved descriptors.
//!
//! A [`RemoteAction`] carries the two marker options: an exposed name override
//! and the formal parameter names used for named binding. An
//! [`ActionDefinition`] pairs the marker with a declared identifier and a
//! [`Callable`]. Resolving a definition validates the marker against the
//! callable and yields the immutable [`ActionDescriptor`] stored in the
//! registry.

use std::collections::HashSet;

use crate::callable::{Callable, IntoAction};
use crate::error::ConfigError;

/// Prefix JSON-RPC 2.0 reserves for system extensions.
pub const RESERVED_PREFIX: &str = "rpc.";

/// Marker options for one remotely invocable method.
///
/// An empty name means "use the declared identifier". An empty parameter list
/// means the action only binds positional params.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteAction {
    name: String,
    parameters: Vec<String>,
}

impl RemoteAction {
    /// Creates a marker with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a marker from borrowed option values.
    #[must_use]
    pub fn declare(name: &str, parameters: &[&str]) -> Self {
        Self::new()
            .with_name(name)
            .with_parameters(parameters.iter().copied())
    }

    /// Overrides the exposed name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declares the formal parameter names in call order.
    #[must_use]
    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the name override, empty when unset.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the declared parameter names.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Picks the exposed name: the override when set, else `declared`.
    #[must_use]
    pub fn resolve_name<'a>(&'a self, declared: &'a str) -> &'a str {
        if self.name.is_empty() {
            declared
        } else {
            self.name.as_str()
        }
    }
}

/// One entry of a registration table.
///
/// ```rust
/// use remote_action::{ActionDefinition, ActionError};
///
/// let definition = ActionDefinition::new("echo", |msg: String| Ok::<_, ActionError>(msg))
///     .with_name("say")
///     .with_parameters(["msg"]);
/// assert_eq!(definition.declared_name(), "echo");
/// ```
#[derive(Debug, Clone)]
pub struct ActionDefinition {
    declared: String,
    marker: RemoteAction,
    callable: Callable,
}

impl ActionDefinition {
    /// Creates a definition with default marker options.
    pub fn new<F, Args>(declared: impl Into<String>, handler: F) -> Self
    where
        F: IntoAction<Args>,
    {
        Self::from_callable(declared, Callable::new(handler))
    }

    /// Creates a definition around an already erased callable.
    pub fn from_callable(declared: impl Into<String>, callable: Callable) -> Self {
        Self {
            declared: declared.into(),
            marker: RemoteAction::new(),
            callable,
        }
    }

    /// Replaces the marker options.
    #[must_use]
    pub fn with_marker(mut self, marker: RemoteAction) -> Self {
        self.marker = marker;
        self
    }

    /// Overrides the exposed name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.marker = self.marker.with_name(name);
        self
    }

    /// Declares the formal parameter names.
    #[must_use]
    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.marker = self.marker.with_parameters(parameters);
        self
    }

    /// Returns the declared identifier.
    #[must_use]
    pub const fn declared_name(&self) -> &str {
        self.declared.as_str()
    }

    /// Returns the marker options.
    #[must_use]
    pub const fn marker(&self) -> &RemoteAction {
        &self.marker
    }

    /// Validates the marker and produces the registry descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyActionName`] or
    /// [`ConfigError::ReservedActionName`] for unusable names, and
    /// [`ConfigError::InvalidParameterSpec`] when the declared parameter names
    /// are blank, repeated, or do not match the callable's arity.
    pub fn resolve(self) -> Result<ActionDescriptor, ConfigError> {
        let name = self.marker.resolve_name(&self.declared).to_owned();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyActionName {
                declared: self.declared,
            });
        }
        if name.starts_with(RESERVED_PREFIX) {
            return Err(ConfigError::ReservedActionName { name });
        }
        validate_parameters(&name, self.marker.parameters(), self.callable.arity())?;

        let RemoteAction { parameters, .. } = self.marker;
        Ok(ActionDescriptor {
            name,
            declared: self.declared,
            parameter_names: parameters,
            callable: self.callable,
        })
    }
}

fn validate_parameters(action: &str, names: &[String], arity: usize) -> Result<(), ConfigError> {
    if names.is_empty() {
        return Ok(());
    }
    if names.len() != arity {
        return Err(ConfigError::invalid_parameters(
            action,
            format!(
                "{} name(s) declared for a callable taking {arity} argument(s)",
                names.len()
            ),
        ));
    }

    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if name.trim().is_empty() {
            return Err(ConfigError::invalid_parameters(
                action,
                "parameter names must not be blank",
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::invalid_parameters(
                action,
                format!("parameter '{name}' is declared more than once"),
            ));
        }
    }
    Ok(())
}

/// Resolved, immutable metadata for one action.
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
    name: String,
    declared: String,
    parameter_names: Vec<String>,
    callable: Callable,
}

impl ActionDescriptor {
    /// Exposed JSON-RPC method name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Identifier the action was declared under.
    #[must_use]
    pub const fn declared_name(&self) -> &str {
        self.declared.as_str()
    }

    /// Formal parameter names; empty for positional-only actions.
    #[must_use]
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// Number of formal parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.callable.arity()
    }

    /// Whether named params can be bound.
    #[must_use]
    pub fn accepts_named_params(&self) -> bool {
        !self.parameter_names.is_empty()
    }

    /// The underlying callable.
    #[must_use]
    pub const fn callable(&self) -> &Callable {
        &self.callable
    }
}
