//! JSON-RPC 2.0 remote action dispatch.
//!
//! Methods become remotely invocable *actions* by marking them with
//! `#[remote_action]` inside a `#[remote_service]` impl block, or by adding
//! [`ActionDefinition`]s to a registry by hand. Each action may override the
//! exposed method name and declare the parameter names that enable named
//! params.
//!
//! The crate is split along the request pipeline:
//!
//! - [`action`] resolves marker options into descriptors.
//! - [`registry`] builds the immutable name to descriptor index.
//! - [`binder`] maps positional or named params onto typed arguments.
//! - [`dispatch`] looks actions up, binds, invokes and wraps the outcome.
//! - [`wire`] turns raw payloads (single or batched) into responses.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use remote_action::{ActionError, ActionRegistry, Dispatcher, remote_service};
//!
//! struct Echo;
//!
//! #[remote_service]
//! impl Echo {
//!     #[remote_action(name = "say", parameters("msg"))]
//!     fn echo(&self, msg: String) -> Result<String, ActionError> {
//!         Ok(msg)
//!     }
//! }
//!
//! let registry = ActionRegistry::build([Arc::new(Echo) as _]).expect("valid registry");
//! let reply = Dispatcher::new(&registry)
//!     .handle_payload(br#"{"jsonrpc":"2.0","method":"say","params":{"msg":"hi"},"id":1}"#);
//! assert!(reply.is_some());
//! ```

extern crate self as remote_action;

pub mod action;
pub mod binder;
pub mod callable;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod wire;

#[cfg(test)]
mod tests;

pub use remote_action_macros::remote_service;

pub use self::action::{ActionDefinition, ActionDescriptor, RemoteAction};
pub use self::binder::{ActionArg, Json, ParamKind, ParamSpec, ValueKind};
pub use self::callable::{Arguments, Callable, IntoAction, IntoOutcome};
pub use self::dispatch::{CancelHandle, Dispatcher, InvokeLimits, dispatch};
pub use self::error::{ActionError, BindError, ConfigError, DispatchError, ErrorCode};
pub use self::protocol::{ErrorObject, Id, Params, Request, Response};
pub use self::registry::{ActionRegistry, RegistryBuilder, RemoteService};
pub use self::wire::{Incoming, Outgoing};
