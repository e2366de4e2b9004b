use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Identifier of one dispatched job.
///
/// Allocated by the scheduler from an auto-incrementing counter starting at 1;
/// never reused within one queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Timing and result of a successfully finished job (payload of `jobFinish`).
#[derive(Debug)]
pub struct JobRecord<R> {
    /// Job identifier.
    pub id: JobId,
    /// When the job was dispatched (before fetching its item).
    pub started_at: SystemTime,
    /// When the process function completed.
    pub ended_at: SystemTime,
    /// Value produced by the process function.
    pub result: Arc<R>,
    /// Jobs running when this one finished, this one included.
    pub running: usize,
}

impl<R> JobRecord<R> {
    /// Wall-clock duration of the job; zero if the clock went backwards.
    pub fn elapsed(&self) -> Duration {
        self.ended_at
            .duration_since(self.started_at)
            .unwrap_or(Duration::ZERO)
    }
}

impl<R> Clone for JobRecord<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            started_at: self.started_at,
            ended_at: self.ended_at,
            result: Arc::clone(&self.result),
            running: self.running,
        }
    }
}
