//! Runtime core: scheduling and lifecycle.
//!
//! The public API from this module is [`JobQueue`] (the handle), its
//! [`JobQueueBuilder`], and the [`Snapshot`]/[`Status`] views of engine state.
//!
//! Internal modules:
//! - [`scheduler`]: the task that owns all engine state and runs the dispatch loop;
//! - [`runner`]: resolves one job's item and runs the process function;
//! - [`builder`]: validates configuration and spawns the scheduler;
//! - [`queue`]: the command-sending handle;
//! - [`state`]: lifecycle status and snapshots.

mod builder;
mod queue;
mod runner;
mod scheduler;
mod state;


pub use builder::JobQueueBuilder;
pub use queue::JobQueue;
pub use state::{Snapshot, Status};
