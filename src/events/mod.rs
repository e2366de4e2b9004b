//! Engine events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the scheduler.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: the scheduler task (lifecycle and per-job events) and
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the single-slot handlers registered with `JobQueue::on`
//!   (called inline by the scheduler), receivers from `JobQueue::subscribe`,
//!   and the subscriber listener feeding `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
