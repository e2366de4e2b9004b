//! # Job abstractions.
//!
//! This module provides the job-related types:
//! - [`Process`] - trait for the per-item work function
//! - [`ProcessFn`] - closure-backed implementation (async return or callback)
//! - [`ProcessRef`] - shared reference to a process (`Arc<dyn Process>`)
//! - [`Done`] - single-resolution completion handle for callback-style code
//! - [`JobId`], [`JobRecord`] - identity and timing of one finished job

mod done;
mod job;
mod process;

pub use done::Done;
pub use job::{JobId, JobRecord};
pub use process::{JobFuture, Process, ProcessFn, ProcessRef};

pub(crate) use done::completion;
