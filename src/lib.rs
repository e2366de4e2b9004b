//! # jobq
//!
//! **jobq** is a bounded-concurrency job runner for async Rust.
//!
//! It pulls work items from a source (a finite sequence, a pull function, a
//! deferred source or a stream), feeds them to a process function, caps the
//! number of jobs in flight and tracks the run through an explicit lifecycle
//! (start, pause, resume, drain, error, finish, poll restart, stop).
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  JobQueue (handle) ── Command ──►┌───────────────────────────────────────┐
//!     │  start/pause/resume/stop   │  Scheduler (single task, owns state)  │
//!     │  on(kind, handler)         │  - ActiveSource (sequence/pull/stream)│
//!     │                            │  - counters, status, pause flag       │
//!     │◄── watch: Snapshot ────────│  - single-slot handlers               │
//!     │◄── AtomicUsize: running ───│  - poll deadline                      │
//!     │                            └──────┬───────────────────▲────────────┘
//!     │                         fill_jobs │ spawn             │ Report
//!     │                                   ▼                   │
//!     │                            ┌──────────────┐  ┌──────────────┐
//!     │                            │ run_job #1   │  │ run_job #N   │
//!     │                            │ fetch→process│  │ fetch→process│
//!     │                            └──────────────┘  └──────────────┘
//!     │
//!     │      Scheduler::emit(event)
//!     │        ├──► SubscriberSet ──► [queue per subscriber] ──► LogWriter, custom...
//!     │        └──► Bus (broadcast channel of Event<R>)
//!     │                    │
//!     └── subscribe() ◄────┘  raw receivers, may lag
//! ```
//!
//! ### Lifecycle
//! ```text
//! Stopped ─start()─► Running ─pause()─► Paused ─resume()─► Running
//!                       │
//!                       ├─ source exhausted ─► Empty ─ last job done ─► Finished ─► processFinish
//!                       │                                                  │ (polling)
//!                       │                                                  ▼
//!                       │                                  Polling ─ delay ─► Running
//!                       └─ job error + stop_on_error ─► Error ─ drained ─► Finished
//!
//! stop(): drain in-flight jobs, emit stop + processFinish, never poll again
//! ```
//!
//! ## Features
//! | Area              | Description                                             | Key types / traits                       |
//! |-------------------|---------------------------------------------------------|------------------------------------------|
//! | **Queue**         | Build, drive and observe a run.                         | [`JobQueue`], [`JobQueueBuilder`]        |
//! | **Sources**       | Sequence, pull function, deferred source, stream.       | [`Source`], [`Pull`], [`PullFn`]         |
//! | **Jobs**          | Per-item work, async or callback style.                 | [`Process`], [`ProcessFn`], [`Done`]     |
//! | **Events**        | Lifecycle and per-job events, multi-subscriber fan-out. | [`Event`], [`EventKind`], [`Subscribe`]  |
//! | **Errors**        | Typed configuration, runtime and job errors.            | [`ConfigError`], [`RuntimeError`], [`JobError`] |
//! | **Configuration** | Concurrency, stop-on-error, polling, debug logging.     | [`Config`]                               |
//!
//! ## Example
//! ```rust
//! use jobq::{Config, EventKind, JobError, JobQueue};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         max_concurrent: 2,
//!         ..Config::default()
//!     };
//!
//!     let queue: JobQueue<u32, u32> = JobQueue::builder(cfg)
//!         .with_source(vec![1, 2, 3, 4, 5])
//!         .with_process_fn(|x: u32| async move { Ok::<_, JobError>(Some(x * 2)) })
//!         .build()?;
//!
//!     queue
//!         .on(EventKind::JobFinish, |ev| println!("result: {:?}", ev.result()))
//!         .start();
//!
//!     let last = queue.wait().await?;
//!     assert_eq!(last.processed, 5);
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod jobs;
mod source;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{JobQueue, JobQueueBuilder, Snapshot, Status};
pub use error::{ConfigError, JobError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use jobs::{Done, JobFuture, JobId, JobRecord, Process, ProcessFn, ProcessRef};
pub use source::{Pull, PullFn, PullFuture, PullRef, Source, SourceKind};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
