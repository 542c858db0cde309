//! Attribute macros for declaring remote actions.
//!
//! `#[remote_service]` turns the `#[remote_action]` methods of an inherent
//! impl block into an implementation of `remote_action::RemoteService`, so a
//! registry can be built from the service without runtime introspection.
//!
//! ```ignore
//! #[remote_service]
//! impl Echo {
//!     #[remote_action(name = "say", parameters("msg"))]
//!     fn echo(&self, msg: String) -> Result<String, ActionError> {
//!         Ok(msg)
//!     }
//! }
//! ```
//!
//! Marker forms:
//!
//! - `#[remote_action]` exposes the method under its own name with
//!   positional-only binding.
//! - `#[remote_action("say")]` or `#[remote_action(name = "say")]` overrides
//!   the exposed name.
//! - `parameters("a", "b")` or `parameters = ["a", "b"]` declares the names
//!   used for named params, one per argument in call order.

use proc_macro::TokenStream;

mod marker;
mod service;

/// Generates a `RemoteService` implementation from marked methods.
///
/// Marked methods take `&self` or no receiver, owned argument types, and
/// return a `Result` whose error converts into `ActionError`.
#[proc_macro_attribute]
pub fn remote_service(attr: TokenStream, item: TokenStream) -> TokenStream {
    service::expand(attr.into(), item.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
