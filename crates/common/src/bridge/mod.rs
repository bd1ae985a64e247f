//! Blocking bridge into the async runtime
//!
//! The HTTP engine calls its interceptors and authenticator on the thread
//! that executes the request. That thread is not a tokio worker, yet the
//! credential store is async. [`RuntimeBridge`] is the one place where the
//! client crosses from the blocking scheduling domain into the async one:
//! it drives a future to completion on an owned runtime handle and waits
//! for it, bounded by a timeout.
//!
//! # Calling contexts
//!
//! | Caller | Behavior |
//! |--------|----------|
//! | Plain thread (network thread, `std::thread`) | `Handle::block_on` |
//! | Worker of a multi-threaded runtime | `block_in_place` + `Handle::block_on` |
//! | Current-thread runtime | refused with `CommonError::Lock` |
//!
//! [`RuntimeBridge::spawn_and_wait`] runs the future as a spawned task
//! instead, so a timed-out wait leaves the work running.
//!
//! The owning runtime should be multi-threaded: a current-thread runtime
//! only drives its timers from `Runtime::block_on`, so a bridged future
//! waiting on one would not observe the timeout.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::trace;

use crate::error::{CommonError, CommonResult};

/// Blocking-wait-on-async-result adapter bound to one runtime.
#[derive(Debug, Clone)]
pub struct RuntimeBridge {
    handle: Handle,
    timeout: Duration,
}

impl RuntimeBridge {
    #[must_use]
    pub fn new(handle: Handle, timeout: Duration) -> Self {
        Self { handle, timeout }
    }

    /// Bridge bound to the runtime the caller is currently running in.
    ///
    /// # Errors
    /// Returns `CommonError::Config` when called outside a tokio runtime.
    pub fn from_current(timeout: Duration) -> CommonResult<Self> {
        let handle = Handle::try_current()
            .map_err(|e| CommonError::config(format!("no tokio runtime available: {e}")))?;
        Ok(Self::new(handle, timeout))
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Run `future` on the bridged runtime and block the calling thread until
    /// it completes or the bridge timeout elapses.
    ///
    /// `name` identifies the operation in errors and traces. On timeout the
    /// future is dropped.
    ///
    /// # Errors
    /// - `CommonError::AsyncTimeout` if the future did not finish in time
    /// - `CommonError::Lock` if the caller is a current-thread runtime, where
    ///   blocking would deadlock the scheduler
    pub fn block_on<F>(&self, name: &str, future: F) -> CommonResult<F::Output>
    where
        F: Future,
    {
        let in_worker = Self::calling_context(name)?;
        let timeout = self.timeout;
        let bounded = async move { tokio::time::timeout(timeout, future).await };

        let outcome = if in_worker {
            trace!(operation = name, "bridging from runtime worker");
            tokio::task::block_in_place(|| self.handle.block_on(bounded))
        } else {
            trace!(operation = name, "bridging from plain thread");
            self.handle.block_on(bounded)
        };

        outcome.map_err(|_| CommonError::async_timeout(name, timeout))
    }

    /// Spawn `future` as a task on the bridged runtime and wait for it like
    /// [`block_on`](Self::block_on).
    ///
    /// A timed-out wait detaches the task instead of dropping it, so work
    /// that must not be torn halfway (a credential write) still runs to
    /// completion in the background.
    ///
    /// # Errors
    /// - `CommonError::AsyncTimeout` if the task did not finish in time; it
    ///   keeps running
    /// - `CommonError::Lock` for a current-thread caller; nothing is spawned
    /// - `CommonError::Internal` if the task panicked or was cancelled
    pub fn spawn_and_wait<F>(&self, name: &str, future: F) -> CommonResult<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        Self::calling_context(name)?;
        let task = self.handle.spawn(future);
        self.block_on(name, task)?
            .map_err(|e| CommonError::internal(format!("task '{name}' did not complete: {e}")))
    }

    /// `true` when called from a multi-thread runtime worker, `false` from a
    /// plain thread.
    fn calling_context(name: &str) -> CommonResult<bool> {
        match Handle::try_current() {
            Err(_) => Ok(false),
            Ok(current) => match current.runtime_flavor() {
                RuntimeFlavor::MultiThread => Ok(true),
                _ => Err(CommonError::lock_resource(
                    "tokio runtime",
                    format!("cannot block on '{name}' inside a current-thread runtime"),
                )),
            },
        }
    }
}
