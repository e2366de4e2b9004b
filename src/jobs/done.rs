//! # Single-resolution completion handle.
//!
//! [`Done`] is the callback channel for pull and process code that cannot
//! simply return a future. It wraps a `oneshot` sender, and every resolving
//! method consumes the handle, so a job can be completed **at most once**.
//!
//! ## Rules
//! - `ok(v)` → `Ok(Some(v))`
//! - `empty()` → `Ok(None)` (no item / no result)
//! - `fail(e)` → `Err(e)`
//! - dropping the handle unresolved → `Err(JobError::Abandoned)`

use std::future::Future;

use tokio::sync::oneshot;

use crate::error::JobError;

/// Completion handle passed to callback-style pull and process functions.
///
/// # Example
/// ```
/// use jobq::{Done, JobError, ProcessRef, ProcessFn};
///
/// let double: ProcessRef<u32, u32> = ProcessFn::callback(|item: u32, done: Done<u32>| {
///     if item == 0 {
///         done.fail(JobError::fail("zero"));
///     } else {
///         done.ok(item * 2);
///     }
/// });
/// # let _ = double;
/// ```
#[derive(Debug)]
pub struct Done<V> {
    tx: oneshot::Sender<Result<Option<V>, JobError>>,
}

impl<V> Done<V> {
    /// Resolves with a value.
    pub fn ok(self, value: V) -> bool {
        self.send(Ok(Some(value)))
    }

    /// Resolves without a value.
    ///
    /// For a pull function this means the source is exhausted.
    pub fn empty(self) -> bool {
        self.send(Ok(None))
    }

    /// Resolves with an error.
    pub fn fail(self, error: JobError) -> bool {
        self.send(Err(error))
    }

    /// Resolves with a complete result.
    ///
    /// Returns `false` if the waiting job is gone.
    pub fn send(self, result: Result<Option<V>, JobError>) -> bool {
        self.tx.send(result).is_ok()
    }
}

/// Creates a handle and the future that observes its resolution.
pub(crate) fn completion<V>() -> (
    Done<V>,
    impl Future<Output = Result<Option<V>, JobError>> + Send + 'static,
)
where
    V: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let fut = async move { rx.await.unwrap_or(Err(JobError::Abandoned)) };
    (Done { tx }, fut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ok_resolves_value() {
        let (done, fut) = completion::<u8>();
        assert!(done.ok(7));
        assert_eq!(fut.await, Ok(Some(7)));
    }

    #[tokio::test]
    async fn test_empty_resolves_none() {
        let (done, fut) = completion::<u8>();
        done.empty();
        assert_eq!(fut.await, Ok(None));
    }

    #[tokio::test]
    async fn test_dropped_handle_is_abandoned() {
        let (done, fut) = completion::<u8>();
        drop(done);
        assert_eq!(fut.await, Err(JobError::Abandoned));
    }

    #[tokio::test]
    async fn test_send_after_receiver_gone_reports_false() {
        let (done, fut) = completion::<u8>();
        drop(fut);
        assert!(!done.fail(JobError::fail("late")));
    }
}
