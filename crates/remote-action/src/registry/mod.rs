//! Action registry: the immutable name to descriptor mapping.
//!
//! Services contribute their marked actions through [`RemoteService`], usually
//! implemented by `#[remote_service]`. Definitions may also be registered
//! directly through [`RegistryBuilder::action`]. Every definition is resolved
//! while the registry is built, so naming and parameter-list problems abort
//! construction instead of surfacing on first dispatch.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::debug;

use crate::action::{ActionDefinition, ActionDescriptor};
use crate::error::ConfigError;

/// Tracing target for registry construction.
pub(crate) const REGISTRY_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::registry");

/// A service object exposing remotely invocable actions.
///
/// The returned definitions keep the service alive through the `Arc` each
/// callable captures.
pub trait RemoteService: Send + Sync + 'static {
    /// Lists the service's marked actions in declaration order.
    fn remote_actions(self: Arc<Self>) -> Vec<ActionDefinition>;
}

/// Registry of resolved actions keyed by exposed name.
///
/// The registry is read-only once built and may be shared across threads
/// without synchronisation.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, ActionDescriptor>,
}

impl ActionRegistry {
    /// Builds a registry from service objects.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateActionName`] when two actions resolve
    /// to the same name, and the resolution errors of
    /// [`ActionDefinition::resolve`] for invalid markers.
    pub fn build<I>(services: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = Arc<dyn RemoteService>>,
    {
        services
            .into_iter()
            .fold(Self::builder(), RegistryBuilder::service)
            .build()
    }

    /// Starts an explicit registration table.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Looks up an action by exposed name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ActionDescriptor> {
        self.actions.get(name)
    }

    /// Returns the number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` when no actions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the exposed names in lexical order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Collects action definitions before validation.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: Vec<ActionDefinition>,
}

impl RegistryBuilder {
    /// Adds one definition.
    #[must_use]
    pub fn action(mut self, definition: ActionDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Adds every action a service exposes.
    #[must_use]
    pub fn service<S>(mut self, service: Arc<S>) -> Self
    where
        S: RemoteService + ?Sized,
    {
        self.definitions.extend(service.remote_actions());
        self
    }

    /// Resolves and indexes the collected definitions.
    ///
    /// # Errors
    ///
    /// Returns the first resolution or duplicate-name failure in registration
    /// order.
    pub fn build(self) -> Result<ActionRegistry, ConfigError> {
        let mut actions: HashMap<String, ActionDescriptor> = HashMap::with_capacity(self.definitions.len());
        for definition in self.definitions {
            let descriptor = definition.resolve()?;
            match actions.entry(descriptor.name().to_owned()) {
                Entry::Occupied(slot) => {
                    let first = slot.get();
                    return Err(ConfigError::duplicate(
                        descriptor.name(),
                        first.declared_name(),
                        descriptor.declared_name(),
                    ));
                }
                Entry::Vacant(slot) => {
                    debug!(
                        target: REGISTRY_TARGET,
                        action = descriptor.name(),
                        declared = descriptor.declared_name(),
                        arity = descriptor.arity(),
                        named = descriptor.accepts_named_params(),
                        "registered action"
                    );
                    slot.insert(descriptor);
                }
            }
        }
        debug!(target: REGISTRY_TARGET, count = actions.len(), "action registry built");
        Ok(ActionRegistry { actions })
    }
}

#[cfg(test)]
mod tests;
