//! Caller-supplied bounds on the invoke step.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Shared flag used to abandon in-flight invocations.
///
/// Cancelling does not stop the callable itself; it stops the dispatcher from
/// waiting for it.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Creates an untriggered handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` once [`CancelHandle::cancel`] has been called on any
    /// clone of this handle.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Timeout and cancellation applied around one invocation.
///
/// With neither set, the callable runs on the dispatching thread. Otherwise
/// it runs on a worker thread; callables cannot be interrupted, so when a
/// limit fires the worker runs to completion in the background and its result
/// is discarded.
#[derive(Debug, Clone, Default)]
pub struct InvokeLimits {
    timeout: Option<Duration>,
    cancel: Option<CancelHandle>,
}

impl InvokeLimits {
    /// Creates unbounded limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the invocation by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Abandons the invocation once `cancel` is triggered.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Cancellation handle, if any.
    #[must_use]
    pub const fn cancel_handle(&self) -> Option<&CancelHandle> {
        self.cancel.as_ref()
    }

    /// Returns `true` when no limit applies.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.timeout.is_none() && self.cancel.is_none()
    }

    pub(super) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelHandle::is_cancelled)
    }
}
