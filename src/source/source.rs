//! # Source shapes and classification.
//!
//! [`Source`] is a tagged variant over the four supported shapes. Each
//! constructor produces exactly one tag, so a source is classified by
//! construction and an unclassifiable source cannot be built.
//!
//! ## Example
//! ```rust
//! use jobq::{JobError, Source, SourceKind};
//!
//! let seq: Source<u32> = vec![1, 2, 3].into();
//! assert_eq!(seq.kind(), SourceKind::Sequence);
//!
//! let pull: Source<u32> = Source::pull(|| async { Ok::<_, JobError>(None) });
//! assert_eq!(pull.kind(), SourceKind::Pull);
//!
//! let later: Source<u32> = Source::deferred(async { Ok(Source::sequence([4, 5])) });
//! assert_eq!(later.kind(), SourceKind::Deferred);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{BoxStream, Stream, StreamExt};

use crate::error::JobError;
use crate::source::pull::{PullFn, PullRef};

/// Classification of a [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Finite ordered list, consumed from the front.
    Sequence,
    /// Function invoked once per item.
    Pull,
    /// Future resolving to another source.
    Deferred,
    /// Asynchronous stream of items.
    Stream,
}

impl SourceKind {
    /// Stable lowercase name (used in snapshots and logs).
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Sequence => "sequence",
            SourceKind::Pull => "pull",
            SourceKind::Deferred => "deferred",
            SourceKind::Stream => "stream",
        }
    }

    /// Whether a drained run over this kind can be restarted by polling.
    pub fn supports_polling(&self) -> bool {
        matches!(self, SourceKind::Pull | SourceKind::Deferred)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supplier of work items.
pub enum Source<T> {
    /// Items owned by the queue, dispatched in order.
    Sequence(VecDeque<T>),
    /// Pull function invoked for every item.
    Pull(PullRef<T>),
    /// Resolves once into another source before scheduling begins.
    Deferred(BoxFuture<'static, Result<Source<T>, JobError>>),
    /// Stream read one item per job; an error item fails that job.
    Stream(BoxStream<'static, Result<T, JobError>>),
}

impl<T> Source<T> {
    /// Takes ownership of `items` as a sequence source.
    pub fn sequence(items: impl IntoIterator<Item = T>) -> Self {
        Source::Sequence(items.into_iter().collect())
    }

    /// Wraps a shared pull function.
    pub fn pull_ref(pull: PullRef<T>) -> Self {
        Source::Pull(pull)
    }

    /// Returns the classification of this source.
    pub fn kind(&self) -> SourceKind {
        match self {
            Source::Sequence(_) => SourceKind::Sequence,
            Source::Pull(_) => SourceKind::Pull,
            Source::Deferred(_) => SourceKind::Deferred,
            Source::Stream(_) => SourceKind::Stream,
        }
    }
}

impl<T: Send + 'static> Source<T> {
    /// Builds a pull source from a closure returning a future.
    pub fn pull<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<T>, JobError>> + Send + 'static,
    {
        Source::Pull(PullFn::arc(f))
    }

    /// Builds a deferred source; `fut` is awaited exactly once after `start()`.
    ///
    /// An `Err` resolution is fatal to the run.
    pub fn deferred<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Result<Source<T>, JobError>> + Send + 'static,
    {
        Source::Deferred(fut.boxed())
    }

    /// Builds a stream source from an infallible stream.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
    {
        Source::Stream(stream.map(Ok).boxed())
    }

    /// Builds a stream source whose items may be errors.
    pub fn try_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<T, JobError>> + Send + 'static,
    {
        Source::Stream(stream.boxed())
    }
}

impl<T> From<Vec<T>> for Source<T> {
    fn from(items: Vec<T>) -> Self {
        Source::Sequence(items.into())
    }
}

impl<T> From<VecDeque<T>> for Source<T> {
    fn from(items: VecDeque<T>) -> Self {
        Source::Sequence(items)
    }
}

impl<T> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Sequence(items) => f
                .debug_struct("Source::Sequence")
                .field("len", &items.len())
                .finish(),
            other => write!(f, "Source::{}", other.kind()),
        }
    }
}
