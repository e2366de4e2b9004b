//! # Work item sources.
//!
//! A queue pulls its items from one of four source shapes:
//!
//! | Kind         | Produces next item by                         | Exhausted when            |
//! |--------------|-----------------------------------------------|---------------------------|
//! | `Sequence`   | popping the front of an owned `VecDeque`      | the deque becomes empty   |
//! | `Pull`       | awaiting a [`Pull`] implementation            | it yields `Ok(None)`      |
//! | `Deferred`   | resolving once into one of the other kinds    | (never dispatched itself) |
//! | `Stream`     | awaiting the next item of a fused stream      | the stream ends           |
//!
//! ## Wiring
//! ```text
//! Source<T> ──start()──► Scheduler::init
//!     ├─ Deferred  ──► spawn resolve ──► Report::Resolved ──► init(resolved)
//!     └─ other     ──► ActiveSource<T> ──next_fetch()──► Fetch<T> ──► runner::run_job
//! ```

mod active;
mod pull;
#[allow(clippy::module_inception)]
mod source;

pub use pull::{Pull, PullFn, PullFuture, PullRef};
pub use source::{Source, SourceKind};

pub(crate) use active::{ActiveSource, Fetch};
