//! Resolved source owned by the scheduler, and the per-job fetch it hands out.
//!
//! ## Rules
//! - `Sequence` items are popped synchronously in the dispatch pass, so a
//!   sequence never has a fetch outstanding.
//! - `Pull` and `Stream` fetches resolve on the job's task; the stream is
//!   shared behind a mutex so exactly one job reads it at a time.
//! - A stream is fused: once it ended, every later fetch reports exhaustion.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::stream::{BoxStream, Fuse, StreamExt};
use tokio::sync::Mutex;

use crate::error::JobError;
use crate::source::pull::PullRef;
use crate::source::source::SourceKind;

pub(crate) type SharedStream<T> = Arc<Mutex<Fuse<BoxStream<'static, Result<T, JobError>>>>>;

/// A source after deferred resolution: ready to produce fetches.
pub(crate) enum ActiveSource<T> {
    Sequence(VecDeque<T>),
    Pull(PullRef<T>),
    Stream(SharedStream<T>),
}

impl<T> ActiveSource<T> {
    pub(crate) fn stream(stream: BoxStream<'static, Result<T, JobError>>) -> Self {
        ActiveSource::Stream(Arc::new(Mutex::new(stream.fuse())))
    }

    pub(crate) fn kind(&self) -> SourceKind {
        match self {
            ActiveSource::Sequence(_) => SourceKind::Sequence,
            ActiveSource::Pull(_) => SourceKind::Pull,
            ActiveSource::Stream(_) => SourceKind::Stream,
        }
    }

    /// `false` only for a sequence with nothing left.
    pub(crate) fn has_items(&self) -> bool {
        match self {
            ActiveSource::Sequence(items) => !items.is_empty(),
            _ => true,
        }
    }

    /// Whether fetches from this source complete asynchronously.
    pub(crate) fn is_async(&self) -> bool {
        !matches!(self, ActiveSource::Sequence(_))
    }

    /// Produces the fetch for the next job; `None` when a sequence is empty.
    pub(crate) fn next_fetch(&mut self) -> Option<Fetch<T>> {
        match self {
            ActiveSource::Sequence(items) => items.pop_front().map(Fetch::Ready),
            ActiveSource::Pull(pull) => Some(Fetch::Pull(Arc::clone(pull))),
            ActiveSource::Stream(stream) => Some(Fetch::Stream(Arc::clone(stream))),
        }
    }
}

/// How one job obtains its item.
pub(crate) enum Fetch<T> {
    Ready(T),
    Pull(PullRef<T>),
    Stream(SharedStream<T>),
}

impl<T: Send + 'static> Fetch<T> {
    pub(crate) fn is_async(&self) -> bool {
        !matches!(self, Fetch::Ready(_))
    }

    /// Resolves the item; `Ok(None)` means the source is exhausted.
    pub(crate) async fn resolve(self) -> Result<Option<T>, JobError> {
        match self {
            Fetch::Ready(item) => Ok(Some(item)),
            Fetch::Pull(pull) => pull.pull().await,
            Fetch::Stream(stream) => {
                let mut guard = stream.lock().await;
                guard.next().await.transpose()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sequence_pops_in_order() {
        let mut src = ActiveSource::Sequence(VecDeque::from([1, 2]));
        assert!(!src.is_async());

        let first = src.next_fetch().map(|f| matches!(f, Fetch::Ready(1)));
        assert_eq!(first, Some(true));
        assert!(src.has_items());

        let second = src.next_fetch().map(|f| matches!(f, Fetch::Ready(2)));
        assert_eq!(second, Some(true));
        assert!(!src.has_items());
        assert!(src.next_fetch().is_none());
    }

    #[tokio::test]
    async fn test_stream_fetch_reports_end() {
        let stream = futures::stream::iter(vec![Ok(1u8), Err(JobError::fail("bad"))]).boxed();
        let mut src = ActiveSource::stream(stream);
        assert_eq!(src.kind(), SourceKind::Stream);

        let next = |src: &mut ActiveSource<u8>| src.next_fetch().map(Fetch::resolve);
        assert_eq!(next(&mut src).unwrap().await, Ok(Some(1)));
        assert_eq!(next(&mut src).unwrap().await, Err(JobError::fail("bad")));
        assert_eq!(next(&mut src).unwrap().await, Ok(None));
        assert_eq!(next(&mut src).unwrap().await, Ok(None));
    }
}
