//! # Event subscribers for the job queue.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Scheduler ── publish(Event) ──► Bus ──► listener task
//!                                              │
//!                                              └──► SubscriberSet::emit()
//!                                                        │
//!                                                  ┌─────┴─────┬─────────┐
//!                                                  ▼           ▼         ▼
//!                                               LogWriter   Metrics   Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use jobq::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Failures;
//!
//! #[async_trait]
//! impl Subscribe<u32> for Failures {
//!     async fn on_event(&self, event: &Event<u32>) {
//!         if event.kind == EventKind::Error {
//!             // increment failure counter
//!         }
//!     }
//! }
//! ```

mod embedded;
mod subscribe;
mod subscriber_set;

pub use embedded::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
