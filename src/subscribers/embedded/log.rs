//! # LogWriter: debug event logger
//!
//! A subscriber that logs every incoming [`Event`] through `tracing` as
//! `(timestamp, event-name, payload)`. The queue attaches it automatically
//! when [`Config::debug`](crate::Config::debug) is set.
//!
//! ## Example output (with `tracing-subscriber` fmt layer)
//! ```text
//! INFO jobq::events: at_ms=1718000000000 event="start" snapshot=Some(Snapshot { .. })
//! INFO jobq::events: at_ms=1718000000001 event="jobRun" job=job-1
//! INFO jobq::events: at_ms=1718000000050 event="jobFinish" job=job-1 running=1 elapsed_ms=49 result=2
//! WARN jobq::events: at_ms=1718000000051 event="error" job=Some(job-2) label="job_failed" reason="boom"
//! ```

use std::fmt;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event logger subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<R> Subscribe<R> for LogWriter
where
    R: fmt::Debug + Send + Sync + 'static,
{
    async fn on_event(&self, e: &Event<R>) {
        let at_ms = e
            .at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let event = e.kind.as_str();

        match e.kind {
            EventKind::Start
            | EventKind::Pause
            | EventKind::Resume
            | EventKind::Stop
            | EventKind::ProcessFinish => {
                info!(target: "jobq::events", at_ms, event, snapshot = ?e.snapshot);
            }
            EventKind::Polling => {
                info!(target: "jobq::events", at_ms, event, delay_ms = ?e.delay_ms, snapshot = ?e.snapshot);
            }
            EventKind::JobFetch => {
                info!(target: "jobq::events", at_ms, event, running = ?e.running);
            }
            EventKind::JobRun => {
                info!(target: "jobq::events", at_ms, event, job = ?e.job);
            }
            EventKind::JobFinish => {
                if let Some(rec) = &e.record {
                    info!(
                        target: "jobq::events",
                        at_ms,
                        event,
                        job = %rec.id,
                        running = rec.running,
                        elapsed_ms = rec.elapsed().as_millis() as u64,
                        result = ?rec.result,
                    );
                }
            }
            EventKind::Error => {
                warn!(
                    target: "jobq::events",
                    at_ms,
                    event,
                    job = ?e.job,
                    label = e.label.unwrap_or("unknown"),
                    reason = e.reason.as_deref().unwrap_or("unknown"),
                );
            }
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                warn!(
                    target: "jobq::events",
                    at_ms,
                    event,
                    subscriber = e.subscriber.unwrap_or("unknown"),
                    reason = e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{JobId, JobRecord};
    use std::sync::Arc;
    use std::time::SystemTime;

    #[tokio::test]
    async fn test_logs_every_kind_without_subscriber_installed() {
        let w = LogWriter::new();
        let now = SystemTime::now();
        let events: Vec<Event<u32>> = vec![
            Event::new(EventKind::Start),
            Event::new(EventKind::JobFetch).with_running(0),
            Event::new(EventKind::JobRun).with_job(JobId(1)),
            Event::new(EventKind::JobFinish).with_record(JobRecord {
                id: JobId(1),
                started_at: now,
                ended_at: now,
                result: Arc::new(2),
                running: 0,
            }),
            Event::new(EventKind::Error).with_reason("boom").with_label("job_failed"),
            Event::subscriber_overflow("x", "full"),
        ];
        for ev in &events {
            Subscribe::<u32>::on_event(&w, ev).await;
        }
        assert_eq!(Subscribe::<u32>::name(&w), "LogWriter");
    }
}
