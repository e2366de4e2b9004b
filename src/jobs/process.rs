//! # Process function abstraction.
//!
//! [`Process`] is the per-item work function. A fresh future is created for
//! every item; the engine awaits it on the job's own task.
//!
//! A process signals completion through one of two channels:
//! - **return**: the future resolves to `Result<Option<R>, JobError>` ([`ProcessFn::arc`]);
//! - **callback**: the closure receives a [`Done`] and resolves it later ([`ProcessFn::callback`]).
//!
//! Either way the job completes exactly once: the returned future is awaited
//! once, and `Done` is consumed by its first resolution.
//!
//! ## Outcomes
//! - `Ok(Some(r))` → `jobFinish` with `r`, processed counter +1
//! - `Ok(None)` → job completes silently (no counter moves)
//! - `Err(e)` → `error` event, error counter +1
//!
//! ## Example
//! ```rust
//! use jobq::{JobError, ProcessFn, ProcessRef};
//!
//! let double: ProcessRef<u32, u32> = ProcessFn::arc(|item: u32| async move {
//!     Ok::<_, JobError>(Some(item * 2))
//! });
//! # let _ = double;
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::JobError;
use crate::jobs::done::{Done, completion};

/// Boxed future returned by [`Process::process`].
pub type JobFuture<R> = Pin<Box<dyn Future<Output = Result<Option<R>, JobError>> + Send>>;

/// Shared handle to a process function.
pub type ProcessRef<T, R> = Arc<dyn Process<T, R>>;

/// # Per-item work function.
///
/// Implementations must be cheap to call: `process` only builds the future,
/// the work happens when the engine awaits it.
pub trait Process<T, R>: Send + Sync + 'static {
    /// Returns a human-readable name (for logs).
    fn name(&self) -> &str {
        "process"
    }

    /// Builds the future that processes `item`.
    fn process(&self, item: T) -> JobFuture<R>;
}

/// Function-backed process implementation.
///
/// Wraps a closure that *creates* a new future per item.
#[derive(Debug)]
pub struct ProcessFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ProcessFn<F> {
    /// Creates a new function-backed process.
    ///
    /// Prefer [`ProcessFn::arc`] when you immediately need a [`ProcessRef`].
    pub fn new(f: F) -> Self {
        Self {
            name: Cow::Borrowed("process"),
            f,
        }
    }

    /// Sets the name used in logs.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Creates the process and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl ProcessFn<()> {
    /// Builds a process from a callback-style closure.
    ///
    /// The closure receives the item and a [`Done`]; the job completes when
    /// `Done` is resolved, and fails with [`JobError::Abandoned`] if it is
    /// dropped unresolved.
    pub fn callback<T, R, C>(f: C) -> ProcessRef<T, R>
    where
        C: Fn(T, Done<R>) + Send + Sync + 'static,
        T: Send + 'static,
        R: Send + 'static,
    {
        ProcessFn::arc(move |item: T| {
            let (done, fut) = completion::<R>();
            f(item, done);
            fut
        })
    }
}

impl<T, R, F, Fut> Process<T, R> for ProcessFn<F>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<R>, JobError>> + Send + 'static,
    T: Send + 'static,
    R: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, item: T) -> JobFuture<R> {
        Box::pin((self.f)(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fn_process_returns_value() {
        let p: ProcessRef<u32, u32> =
            ProcessFn::arc(|x: u32| async move { Ok::<_, JobError>(Some(x + 1)) });
        assert_eq!(p.process(1).await, Ok(Some(2)));
        assert_eq!(p.name(), "process");
    }

    #[tokio::test]
    async fn test_named_process() {
        let p = ProcessFn::new(|x: u8| async move { Ok::<_, JobError>(Some(x)) }).named("echo");
        assert_eq!(Process::<u8, u8>::name(&p), "echo");
    }

    #[tokio::test]
    async fn test_callback_process_resolves_once() {
        let p: ProcessRef<u32, String> = ProcessFn::callback(|x: u32, done: Done<String>| {
            tokio::spawn(async move {
                done.ok(format!("v{x}"));
            });
        });
        assert_eq!(p.process(4).await, Ok(Some("v4".to_string())));
    }

    #[tokio::test]
    async fn test_callback_dropped_done_is_abandoned() {
        let p: ProcessRef<u32, u32> = ProcessFn::callback(|_x: u32, _done: Done<u32>| {});
        assert_eq!(p.process(1).await, Err(JobError::Abandoned));
    }
}
