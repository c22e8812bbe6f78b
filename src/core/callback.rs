//! User callbacks with an explicit blocking/async capability.
//!
//! The capability is fixed when the callback is built, so an operation checks
//! it once on entry: concurrent scheduling needs an async callback, while a
//! blocking callback is only ever called inline, one item at a time.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::error;

use crate::core::config::ConcurrencyMode;
use crate::core::diagnostics::describe_panic;
use crate::core::errors::{ModwalkError, Result};

type BlockingFn<T> = dyn Fn(T) -> Result<()> + Send + Sync;
type AsyncFn<T> = dyn Fn(T) -> BoxFuture<'static, Result<()>> + Send + Sync;

/// A per-item callback.
pub enum Callback<T> {
    /// Called inline; returns when the work is done.
    Blocking(Arc<BlockingFn<T>>),
    /// Returns a future that is awaited (or joined with its siblings).
    Async(Arc<AsyncFn<T>>),
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Blocking(f) => Self::Blocking(Arc::clone(f)),
            Self::Async(f) => Self::Async(Arc::clone(f)),
        }
    }
}

impl<T> std::fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocking(_) => f.write_str("Callback::Blocking"),
            Self::Async(_) => f.write_str("Callback::Async"),
        }
    }
}

impl<T: Send + 'static> Callback<T> {
    /// Wrap a blocking function.
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn(T) -> Result<()> + Send + Sync + 'static,
    {
        Self::Blocking(Arc::new(f))
    }

    /// Wrap an async function.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::Async(Arc::new(move |arg| f(arg).boxed()))
    }

    /// Whether this callback may be scheduled concurrently.
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    /// Reject concurrent scheduling of a blocking callback.
    pub fn ensure_schedulable(&self, mode: ConcurrencyMode, option: &str) -> Result<()> {
        if mode.is_concurrent() && !self.is_async() {
            return Err(ModwalkError::config_field(
                format!("Invalid load callback. {option}: 'concurrent' requires an async callback."),
                option,
            ));
        }
        Ok(())
    }

    /// Run the callback for one item. A panic inside the callback is logged
    /// and reported as [`ModwalkError::Callback`].
    pub async fn invoke(&self, arg: T) -> Result<()> {
        let outcome = match self {
            Self::Blocking(f) => std::panic::catch_unwind(AssertUnwindSafe(|| f(arg))),
            Self::Async(f) => AssertUnwindSafe(f(arg)).catch_unwind().await,
        };
        outcome.unwrap_or_else(|payload| {
            error!("{}", describe_panic("Callback panicked", payload.as_ref()));
            Err(ModwalkError::callback("callback panicked"))
        })
    }
}
