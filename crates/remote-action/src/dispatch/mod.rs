//! Request dispatch: resolve, bind, invoke, respond.
//!
//! Each request runs through the same stateless pipeline. The method name is
//! looked up in the registry, params are bound to the action's signature, the
//! callable runs, and its outcome becomes the response. Every failure along
//! the way turns into a JSON-RPC error object; notifications never produce a
//! response, whatever the outcome.

mod invoke;
mod limits;

use serde_json::Value;
use tracing::{debug, warn};

use crate::binder;
use crate::error::DispatchError;
use crate::protocol::{Params, Request, Response};
use crate::registry::ActionRegistry;

pub use self::limits::{CancelHandle, InvokeLimits};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::dispatch");

/// Dispatches decoded requests against a borrowed registry.
///
/// A dispatcher holds no per-request state and can be shared between threads
/// handling independent requests.
#[derive(Debug, Clone)]
pub struct Dispatcher<'r> {
    registry: &'r ActionRegistry,
    limits: InvokeLimits,
}

impl<'r> Dispatcher<'r> {
    /// Creates a dispatcher without invoke limits.
    #[must_use]
    pub fn new(registry: &'r ActionRegistry) -> Self {
        Self {
            registry,
            limits: InvokeLimits::default(),
        }
    }

    /// Sets the limits applied by [`Dispatcher::dispatch`].
    #[must_use]
    pub fn with_limits(mut self, limits: InvokeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Registry used for lookups.
    #[must_use]
    pub const fn registry(&self) -> &'r ActionRegistry {
        self.registry
    }

    /// Default limits applied to every invocation.
    #[must_use]
    pub const fn limits(&self) -> &InvokeLimits {
        &self.limits
    }

    /// Dispatches one request with the dispatcher's default limits.
    ///
    /// Returns `None` exactly when the request is a notification.
    #[must_use]
    pub fn dispatch(&self, request: Request) -> Option<Response> {
        self.dispatch_with(request, &self.limits)
    }

    /// Dispatches one request under caller-supplied limits.
    ///
    /// Returns `None` exactly when the request is a notification.
    #[must_use]
    pub fn dispatch_with(&self, request: Request, limits: &InvokeLimits) -> Option<Response> {
        let (method, params, id) = request.into_parts();
        let outcome = self.execute(&method, params, limits);

        let Some(id) = id else {
            if let Err(error) = outcome {
                debug!(
                    target: DISPATCH_TARGET,
                    method = %method,
                    %error,
                    "notification failed; no response sent"
                );
            }
            return None;
        };

        Some(match outcome {
            Ok(result) => Response::success(id, result),
            Err(error) => {
                log_failure(&method, &error);
                Response::failure(id, error.to_error_object())
            }
        })
    }

    /// Runs the resolve, bind and invoke steps for one call.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MethodNotFound`] for unknown methods,
    /// [`DispatchError::InvalidParams`] when binding fails, and the
    /// invocation's own failure otherwise.
    pub fn execute(
        &self,
        method: &str,
        params: Option<Params>,
        limits: &InvokeLimits,
    ) -> Result<Value, DispatchError> {
        let descriptor = self
            .registry
            .lookup(method)
            .ok_or_else(|| DispatchError::method_not_found(method))?;
        let arguments = binder::bind(descriptor, params)?;
        debug!(
            target: DISPATCH_TARGET,
            method,
            arity = descriptor.arity(),
            "invoking action"
        );
        invoke::invoke(descriptor.callable(), arguments, limits)
    }
}

/// Dispatches one request against `registry` without invoke limits.
///
/// Returns `None` exactly when the request is a notification.
#[must_use]
pub fn dispatch(registry: &ActionRegistry, request: Request) -> Option<Response> {
    Dispatcher::new(registry).dispatch(request)
}

fn log_failure(method: &str, error: &DispatchError) {
    match error {
        DispatchError::Panicked { .. }
        | DispatchError::Internal { .. }
        | DispatchError::TimedOut { .. }
        | DispatchError::Cancelled => {
            warn!(target: DISPATCH_TARGET, method, %error, "action failed");
        }
        _ => {
            debug!(target: DISPATCH_TARGET, method, %error, "request rejected");
        }
    }
}
