//! # Pull functions.
//!
//! A [`Pull`] is invoked once per dispatched job to obtain the next item.
//! It reports through the returned future (direct value or awaited value) or,
//! when built with [`PullFn::callback`], through a [`Done`] handle.
//!
//! `Ok(None)` means "no more items": the queue moves to `Empty` and drains.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::JobError;
use crate::jobs::{Done, completion};

/// Boxed future returned by [`Pull::pull`].
pub type PullFuture<T> = Pin<Box<dyn Future<Output = Result<Option<T>, JobError>> + Send>>;

/// Shared handle to a pull function.
pub type PullRef<T> = Arc<dyn Pull<T>>;

/// Asynchronous item supplier.
///
/// With a concurrency limit `n > 0` the engine may have up to `n` pulls in
/// flight at once; with an unbounded limit pulls are issued one at a time.
pub trait Pull<T>: Send + Sync + 'static {
    /// Builds the future yielding the next item.
    fn pull(&self) -> PullFuture<T>;
}

/// Function-backed pull implementation.
#[derive(Debug)]
pub struct PullFn<F> {
    f: F,
}

impl<F> PullFn<F> {
    /// Creates a new function-backed pull.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the pull and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl PullFn<()> {
    /// Builds a pull from a callback-style closure.
    ///
    /// The closure receives a [`Done`]; `done.ok(item)` yields an item,
    /// `done.empty()` signals exhaustion.
    ///
    /// # Example
    /// ```
    /// use jobq::{Done, PullFn, PullRef};
    ///
    /// let pull: PullRef<u32> = PullFn::callback(|done: Done<u32>| {
    ///     done.empty();
    /// });
    /// # let _ = pull;
    /// ```
    pub fn callback<T, C>(f: C) -> PullRef<T>
    where
        C: Fn(Done<T>) + Send + Sync + 'static,
        T: Send + 'static,
    {
        PullFn::arc(move || {
            let (done, fut) = completion::<T>();
            f(done);
            fut
        })
    }
}

impl<T, F, Fut> Pull<T> for PullFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<T>, JobError>> + Send + 'static,
    T: Send + 'static,
{
    fn pull(&self) -> PullFuture<T> {
        Box::pin((self.f)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_fn_pull_counts_down() {
        let left = Arc::new(AtomicU32::new(2));
        let pull: PullRef<u32> = PullFn::arc(move || {
            let left = Arc::clone(&left);
            async move {
                let n = left.load(Ordering::SeqCst);
                if n == 0 {
                    return Ok::<_, JobError>(None);
                }
                left.store(n - 1, Ordering::SeqCst);
                Ok(Some(n))
            }
        });

        assert_eq!(pull.pull().await, Ok(Some(2)));
        assert_eq!(pull.pull().await, Ok(Some(1)));
        assert_eq!(pull.pull().await, Ok(None));
    }

    #[tokio::test]
    async fn test_callback_pull_reports_error() {
        let pull: PullRef<u32> = PullFn::callback(|done: Done<u32>| {
            done.fail(JobError::fail("offline"));
        });
        assert_eq!(pull.pull().await, Err(JobError::fail("offline")));
    }
}
