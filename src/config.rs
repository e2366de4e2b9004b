//! # Queue configuration.
//!
//! Provides [`Config`] centralized settings for one [`JobQueue`](crate::JobQueue).
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → unbounded (no cap on in-flight jobs)
//! - `poll_interval = None` → polling disabled (the run terminates)

use std::time::Duration;

/// Configuration for a job queue.
///
/// ## Field semantics
/// - `max_concurrent`: cap on simultaneously running jobs (`0` = unbounded)
/// - `stop_on_error`: first job error stops dispatching and drains the run
/// - `poll_interval`: delay before restarting a drained run (pull/deferred sources only)
/// - `debug`: attach the built-in [`LogWriter`](crate::LogWriter) to every event
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of jobs in flight at once.
    ///
    /// - `0` = unbounded
    /// - `n > 0` = at most `n` jobs fetched/processing simultaneously
    pub max_concurrent: usize,

    /// Stop dispatching after the first job error.
    ///
    /// In-flight jobs still complete; the run finishes once they drain.
    pub stop_on_error: bool,

    /// Delay before a drained run restarts dispatching.
    ///
    /// Only valid for pull and deferred sources. With polling enabled the
    /// engine never terminates on its own; call `stop()` to end it.
    pub poll_interval: Option<Duration>,

    /// Log every emitted event through the built-in [`LogWriter`](crate::LogWriter).
    pub debug: bool,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip older items. Minimum value is 1 (enforced by Bus).
    /// Only raw [`JobQueue::subscribe`](crate::JobQueue::subscribe) receivers
    /// read the bus; [`Subscribe`](crate::Subscribe) implementations have
    /// their own queues.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the concurrency limit as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` concurrent jobs
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrent == 0 {
            None
        } else {
            Some(self.max_concurrent)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns `true` when a poll interval is configured.
    #[inline]
    pub fn is_polling(&self) -> bool {
        self.poll_interval.is_some()
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `max_concurrent = 1` (one job at a time)
    /// - `stop_on_error = false`
    /// - `poll_interval = None` (run to completion)
    /// - `debug = false`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            stop_on_error: false,
            poll_interval: None,
            debug: false,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_means_unbounded() {
        let cfg = Config {
            max_concurrent: 0,
            ..Config::default()
        };
        assert_eq!(cfg.concurrency_limit(), None);
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.concurrency_limit(), Some(1));
        assert!(!cfg.stop_on_error);
        assert!(!cfg.is_polling());
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
    }

    #[test]
    fn test_bus_capacity_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
