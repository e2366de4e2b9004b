//! # Lifecycle status and engine snapshots.
//!
//! ```text
//!            start()            source exhausted          last job done
//! Stopped ───────────► Running ──────────────────► Empty ───────────────► Finished
//!                       │  ▲  ▲                                 │ (polling)
//!               pause() │  │  │ resume()                        ▼
//!                       ▼  │  └──────── Paused ◄──pause()── Polling
//!                     Paused                                    │
//!                          └──────────── delay elapsed ◄────────┘ ─► Running
//!
//! Error: stop-on-error failure (drains, then Finished) or failed resolution (terminal).
//! ```

use std::fmt;
use std::time::SystemTime;

use crate::source::SourceKind;

/// Lifecycle status of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// Built but not started.
    #[default]
    Stopped,
    /// Dispatching jobs.
    Running,
    /// No new jobs are fetched; in-flight jobs complete.
    Paused,
    /// Source exhausted; in-flight jobs are draining.
    Empty,
    /// A failure stopped dispatching.
    Error,
    /// Run complete.
    Finished,
    /// Run drained; waiting for the poll interval to restart.
    Polling,
}

impl Status {
    /// Stable lowercase name (used in logs).
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Stopped => "stopped",
            Status::Running => "running",
            Status::Paused => "paused",
            Status::Empty => "empty",
            Status::Error => "error",
            Status::Finished => "finished",
            Status::Polling => "polling",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the engine, attached to lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// When `start()` was accepted.
    pub start_time: Option<SystemTime>,
    /// When the run ended (set on `processFinish` only).
    pub end_time: Option<SystemTime>,
    /// Jobs that completed with a result.
    pub processed: u64,
    /// Jobs that failed.
    pub errors: u64,
    /// Configured concurrency limit (`0` = unbounded).
    pub concurrency_limit: usize,
    /// Whether the first error stops the run.
    pub stop_on_error: bool,
    /// Kind of the current source (the resolved kind once a deferred source resolved).
    pub source_kind: SourceKind,
    /// Lifecycle status.
    pub status: Status,
}

impl Snapshot {
    pub(crate) fn new(concurrency_limit: usize, stop_on_error: bool, source_kind: SourceKind) -> Self {
        Self {
            start_time: None,
            end_time: None,
            processed: 0,
            errors: 0,
            concurrency_limit,
            stop_on_error,
            source_kind,
            status: Status::Stopped,
        }
    }

    /// Returns a copy with `end_time` set.
    pub fn with_end_time(mut self, at: SystemTime) -> Self {
        self.end_time = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_snapshot_is_stopped_and_empty() {
        let s = Snapshot::new(2, true, SourceKind::Pull);
        assert_eq!(s.status, Status::Stopped);
        assert_eq!((s.processed, s.errors), (0, 0));
        assert!(s.start_time.is_none() && s.end_time.is_none());
    }

    #[test]
    fn test_end_time_override() {
        let at = SystemTime::now();
        let s = Snapshot::new(1, false, SourceKind::Sequence).with_end_time(at);
        assert_eq!(s.end_time, Some(at));
    }

    #[test]
    fn test_status_names() {
        assert_eq!(Status::default().to_string(), "stopped");
        assert_eq!(Status::Polling.as_str(), "polling");
    }
}
