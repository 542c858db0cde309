//! Type-erased invokers built from typed handler functions.
//!
//! Any `Fn` whose arguments implement [`ActionArg`] and whose return value
//! implements [`IntoOutcome`] converts into a [`Callable`]. The conversion
//! records one [`ParamSpec`] per argument so the binder can decode wire values
//! before the handler runs.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::binder::{ActionArg, BoundArg, ParamSpec};
use crate::error::ActionError;

type Invoker = dyn Fn(Arguments) -> Result<Value, ActionError> + Send + Sync;

/// Ordered, decoded arguments ready for invocation.
#[derive(Debug)]
pub struct Arguments {
    values: std::vec::IntoIter<BoundArg>,
}

impl Arguments {
    pub(crate) fn new(values: Vec<BoundArg>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    /// Number of arguments not yet consumed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when every argument has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    /// Takes the next argument as `T`.
    ///
    /// # Errors
    ///
    /// Returns an internal [`ActionError`] when the list is exhausted or the
    /// next value was decoded as a different type.
    pub fn next_arg<T: ActionArg>(&mut self) -> Result<T, ActionError> {
        self.values
            .next()
            .ok_or_else(|| ActionError::internal("argument list exhausted"))?
            .downcast::<T>()
            .ok_or_else(|| ActionError::internal("bound argument has an unexpected type"))
    }
}

/// Conversion of a handler's return value into a JSON result.
pub trait IntoOutcome {
    /// Serialises the success value or surfaces the failure.
    ///
    /// # Errors
    ///
    /// Returns the handler's own error, or an internal error when the success
    /// value cannot be serialised.
    fn into_outcome(self) -> Result<Value, ActionError>;
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: Serialize,
    E: Into<ActionError>,
{
    fn into_outcome(self) -> Result<Value, ActionError> {
        let value = self.map_err(Into::into)?;
        serde_json::to_value(value)
            .map_err(|error| ActionError::internal(format!("failed to serialise result: {error}")))
    }
}

/// A registered handler with its parameter signature.
#[derive(Clone)]
pub struct Callable {
    params: Arc<[ParamSpec]>,
    invoker: Arc<Invoker>,
}

impl Callable {
    /// Wraps a typed handler.
    pub fn new<F, Args>(handler: F) -> Self
    where
        F: IntoAction<Args>,
    {
        handler.into_callable()
    }

    /// Builds a callable from a signature and an untyped invoker.
    ///
    /// The invoker receives arguments decoded according to `params`.
    pub fn from_parts<I>(params: Vec<ParamSpec>, invoker: I) -> Self
    where
        I: Fn(Arguments) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        Self {
            params: params.into(),
            invoker: Arc::new(invoker),
        }
    }

    /// Number of formal parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Signature in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Runs the handler with already bound arguments.
    ///
    /// # Errors
    ///
    /// Returns whatever the handler reports.
    pub fn invoke(&self, arguments: Arguments) -> Result<Value, ActionError> {
        (self.invoker)(arguments)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Handlers convertible into a [`Callable`].
///
/// Implemented for `Fn` closures and functions of up to eight arguments.
/// `Args` is the tuple of argument types and only exists to keep the
/// implementations apart.
pub trait IntoAction<Args>: Send + Sync + 'static {
    /// Erases the handler's argument types.
    fn into_callable(self) -> Callable;
}

impl<F, R> IntoAction<()> for F
where
    F: Fn() -> R + Send + Sync + 'static,
    R: IntoOutcome,
{
    fn into_callable(self) -> Callable {
        Callable::from_parts(Vec::new(), move |_arguments: Arguments| (self)().into_outcome())
    }
}

macro_rules! impl_into_action {
    ($($arg:ident),+) => {
        impl<F, R, $($arg,)+> IntoAction<($($arg,)+)> for F
        where
            F: Fn($($arg),+) -> R + Send + Sync + 'static,
            R: IntoOutcome,
            $($arg: ActionArg,)+
        {
            fn into_callable(self) -> Callable {
                Callable::from_parts(
                    vec![$(ParamSpec::of::<$arg>()),+],
                    move |mut arguments: Arguments| {
                        (self)($(arguments.next_arg::<$arg>()?),+).into_outcome()
                    },
                )
            }
        }
    };
}

impl_into_action!(A1);
impl_into_action!(A1, A2);
impl_into_action!(A1, A2, A3);
impl_into_action!(A1, A2, A3, A4);
impl_into_action!(A1, A2, A3, A4, A5);
impl_into_action!(A1, A2, A3, A4, A5, A6);
impl_into_action!(A1, A2, A3, A4, A5, A6, A7);
impl_into_action!(A1, A2, A3, A4, A5, A6, A7, A8);
