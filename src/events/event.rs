//! # Events emitted by the scheduler.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Lifecycle events**: engine state changes (start, pause, resume, stop, polling, finish)
//! - **Job events**: per-job flow (fetch, run, finish, error)
//! - **Subscriber events**: delivery problems of the fan-out layer
//!
//! The [`Event`] struct carries the metadata relevant to its kind: job id,
//! running count, a [`JobRecord`] for finished jobs, a [`Snapshot`] for
//! lifecycle events, and an error reason/label for failures.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Job completions are **not** ordered by fetch order; use `seq` to restore emission order.
//!
//! ## Example
//! ```rust
//! use jobq::{Event, EventKind, JobId};
//!
//! let ev: Event<u32> = Event::new(EventKind::Error)
//!     .with_job(JobId(3))
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::Error);
//! assert_eq!(ev.job, Some(JobId(3)));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::Snapshot;
use crate::jobs::{JobId, JobRecord};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of engine events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Lifecycle events ===
    /// `start()` accepted.
    ///
    /// Sets: `snapshot`
    Start,

    /// `pause()` accepted; no new jobs are fetched.
    ///
    /// Sets: `snapshot`
    Pause,

    /// `resume()` accepted; dispatching continues.
    ///
    /// Sets: `snapshot`
    Resume,

    /// `stop()` took effect: in-flight jobs drained, `ProcessFinish` follows immediately.
    ///
    /// Sets: `snapshot`
    Stop,

    /// Run drained and a poll restart is scheduled.
    ///
    /// Sets: `snapshot`, `delay_ms`
    Polling,

    /// Run is over; the engine will not dispatch again.
    ///
    /// Sets: `snapshot` (with `end_time`)
    ProcessFinish,

    // === Job events ===
    /// A dispatch iteration is about to fetch an item.
    ///
    /// Sets: `running` (jobs in flight before this one)
    JobFetch,

    /// A job was allocated and launched.
    ///
    /// Sets: `job`
    JobRun,

    /// A job completed with a result.
    ///
    /// Sets: `job`, `record`, `running`
    JobFinish,

    /// A job or the source failed.
    ///
    /// Sets: `reason`, `label`; `job` when a single job failed
    Error,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `subscriber`, `reason`
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `subscriber`, `reason`
    SubscriberOverflow,
}

impl EventKind {
    /// Event name as exposed to handlers and logs.
    ///
    /// `Polling` keeps its historical wire name `"pooling"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Pause => "pause",
            EventKind::Resume => "resume",
            EventKind::Stop => "stop",
            EventKind::Polling => "pooling",
            EventKind::ProcessFinish => "processFinish",
            EventKind::JobFetch => "jobFetch",
            EventKind::JobRun => "jobRun",
            EventKind::JobFinish => "jobFinish",
            EventKind::Error => "error",
            EventKind::SubscriberPanicked => "subscriberPanicked",
            EventKind::SubscriberOverflow => "subscriberOverflow",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug)]
pub struct Event<R> {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Job the event refers to.
    pub job: Option<JobId>,
    /// Running-job count observed when the event was emitted.
    pub running: Option<usize>,
    /// Timing and result of a finished job.
    pub record: Option<JobRecord<R>>,
    /// Engine state for lifecycle events.
    pub snapshot: Option<Snapshot>,
    /// Poll restart delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Stable error label (see `as_label` on the error types).
    pub label: Option<&'static str>,
    /// Subscriber name for subscriber events.
    pub subscriber: Option<&'static str>,
}

impl<R> Clone for Event<R> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            at: self.at,
            kind: self.kind,
            job: self.job,
            running: self.running,
            record: self.record.clone(),
            snapshot: self.snapshot.clone(),
            delay_ms: self.delay_ms,
            reason: self.reason.clone(),
            label: self.label,
            subscriber: self.subscriber,
        }
    }
}

impl<R> Event<R> {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            job: None,
            running: None,
            record: None,
            snapshot: None,
            delay_ms: None,
            reason: None,
            label: None,
            subscriber: None,
        }
    }

    /// Attaches a job id.
    #[inline]
    pub fn with_job(mut self, id: JobId) -> Self {
        self.job = Some(id);
        self
    }

    /// Attaches a running-job count.
    #[inline]
    pub fn with_running(mut self, running: usize) -> Self {
        self.running = Some(running);
        self
    }

    /// Attaches a finished-job record (also sets `job` and `running`).
    #[inline]
    pub fn with_record(mut self, record: JobRecord<R>) -> Self {
        self.job = Some(record.id);
        self.running = Some(record.running);
        self.record = Some(record);
        self
    }

    /// Attaches an engine snapshot.
    #[inline]
    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Attaches a poll delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: std::time::Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a stable error label.
    #[inline]
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Result of a finished job, if this is a `JobFinish` event.
    pub fn result(&self) -> Option<&R> {
        self.record.as_ref().map(|r| r.result.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_seq_is_monotonic() {
        let a: Event<()> = Event::new(EventKind::JobRun);
        let b: Event<()> = Event::new(EventKind::JobRun);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_record_sets_job_and_running() {
        let now = SystemTime::now();
        let ev = Event::new(EventKind::JobFinish).with_record(JobRecord {
            id: JobId(9),
            started_at: now,
            ended_at: now,
            result: Arc::new("done"),
            running: 2,
        });
        assert_eq!(ev.job, Some(JobId(9)));
        assert_eq!(ev.running, Some(2));
        assert_eq!(ev.result(), Some(&"done"));
    }

    #[test]
    fn test_delay_is_clamped_to_u32() {
        let ev: Event<()> = Event::new(EventKind::Polling).with_delay(Duration::from_secs(u64::MAX / 2));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(EventKind::Polling.as_str(), "pooling");
        assert_eq!(EventKind::ProcessFinish.to_string(), "processFinish");
    }

    #[test]
    fn test_subscriber_overflow_carries_name() {
        let ev: Event<()> = Event::subscriber_overflow("audit", "full");
        assert_eq!(ev.subscriber, Some("audit"));
        assert!(ev.reason.as_deref().unwrap_or_default().contains("full"));
    }
}
