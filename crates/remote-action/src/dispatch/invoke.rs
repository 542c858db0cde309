//! The invoke step, with panic isolation and optional limits.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

use super::{DISPATCH_TARGET, InvokeLimits};
use crate::callable::{Arguments, Callable};
use crate::error::DispatchError;

/// How often a pending invocation re-checks its cancellation handle.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(5);

type Outcome = Result<Value, DispatchError>;

pub(super) fn invoke(callable: &Callable, arguments: Arguments, limits: &InvokeLimits) -> Outcome {
    if limits.is_unbounded() {
        return run_guarded(callable, arguments);
    }
    invoke_bounded(callable.clone(), arguments, limits)
}

/// Runs the callable, converting a panic into an error.
fn run_guarded(callable: &Callable, arguments: Arguments) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(|| callable.invoke(arguments))) {
        Ok(outcome) => outcome.map_err(DispatchError::from),
        Err(payload) => Err(DispatchError::panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic payload was not a string".to_owned())
}

fn invoke_bounded(callable: Callable, arguments: Arguments, limits: &InvokeLimits) -> Outcome {
    let (sender, receiver) = mpsc::sync_channel(1);
    thread::Builder::new()
        .name("remote-action-invoke".to_owned())
        .spawn(move || {
            let outcome = run_guarded(&callable, arguments);
            if sender.send(outcome).is_err() {
                debug!(
                    target: DISPATCH_TARGET,
                    "invocation finished after its caller stopped waiting; result discarded"
                );
            }
        })
        .map_err(|error| {
            DispatchError::internal(format!("failed to spawn invocation thread: {error}"))
        })?;
    await_outcome(&receiver, limits)
}

fn await_outcome(receiver: &Receiver<Outcome>, limits: &InvokeLimits) -> Outcome {
    let started = Instant::now();
    loop {
        let wait = next_wait(limits, started.elapsed());
        match receiver.recv_timeout(wait) {
            Ok(outcome) => return outcome,
            Err(RecvTimeoutError::Disconnected) => {
                return Err(DispatchError::internal(
                    "invocation thread exited without reporting a result",
                ));
            }
            Err(RecvTimeoutError::Timeout) => {}
        }

        if limits.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }
        if let Some(timeout) = limits.timeout()
            && started.elapsed() >= timeout
        {
            return Err(DispatchError::TimedOut {
                millis: timeout.as_millis(),
            });
        }
    }
}

/// Longest wait before the limits must be checked again.
fn next_wait(limits: &InvokeLimits, elapsed: Duration) -> Duration {
    let remaining = limits
        .timeout()
        .map(|timeout| timeout.saturating_sub(elapsed));
    match (remaining, limits.cancel_handle()) {
        (Some(remaining), Some(_)) => remaining.min(CANCEL_POLL_INTERVAL),
        (Some(remaining), None) => remaining,
        (None, _) => CANCEL_POLL_INTERVAL,
    }
}
