//! # Run a single job.
//!
//! Executes one dispatched job on its own task and reports back to the
//! scheduler over the report channel.
//!
//! ## Report flow
//!
//! ```text
//! Sequence item:
//!   resolve (ready) → process → Finished
//!
//! Pull / stream item:
//!   resolve → Ok(Some) → Fetched{exhausted: false} → process → Finished
//!           → Ok(None) → Fetched{exhausted: true}
//!           → Err      → Fetched{exhausted: false} → Finished(Err)
//! ```
//!
//! ## Rules
//! - Every job sends **exactly one** terminal report: `Finished` or `Fetched{exhausted: true}`
//! - Asynchronous fetches are acknowledged **before** the process function runs
//! - Panics in pull or process code become [`JobError::Panicked`]

use std::panic::AssertUnwindSafe;
use std::time::SystemTime;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::scheduler::Report;
use crate::error::JobError;
use crate::jobs::{JobId, ProcessRef};
use crate::source::{Fetch, Source};

/// Resolves the job's item, runs `process` over it and reports the outcome.
///
/// Send failures are ignored: they only happen once the scheduler is gone.
pub(crate) async fn run_job<T, R>(
    id: JobId,
    fetch: Fetch<T>,
    process: ProcessRef<T, R>,
    reports: mpsc::UnboundedSender<Report<T, R>>,
) where
    T: Send + 'static,
    R: Send + Sync + 'static,
{
    let started_at = SystemTime::now();
    let acknowledge = fetch.is_async();

    let fetched = AssertUnwindSafe(fetch.resolve())
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(JobError::panicked(panic)));

    let item = match fetched {
        Ok(Some(item)) => item,
        Ok(None) => {
            let _ = reports.send(Report::Fetched { exhausted: true });
            return;
        }
        Err(error) => {
            if acknowledge {
                let _ = reports.send(Report::Fetched { exhausted: false });
            }
            let _ = reports.send(Report::Finished {
                id,
                started_at,
                ended_at: SystemTime::now(),
                outcome: Err(error),
            });
            return;
        }
    };

    if acknowledge {
        let _ = reports.send(Report::Fetched { exhausted: false });
    }

    let outcome = AssertUnwindSafe(async move { process.process(item).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(JobError::panicked(panic)));

    let _ = reports.send(Report::Finished {
        id,
        started_at,
        ended_at: SystemTime::now(),
        outcome,
    });
}

/// Awaits a deferred source once and reports what it resolved to.
///
/// Gives up (dropping the deferred future) once the scheduler exits.
pub(crate) async fn resolve_source<T, R>(
    deferred: futures::future::BoxFuture<'static, Result<Source<T>, JobError>>,
    reports: mpsc::UnboundedSender<Report<T, R>>,
    token: CancellationToken,
) where
    T: Send + 'static,
    R: Send + Sync + 'static,
{
    let resolving = AssertUnwindSafe(deferred).catch_unwind();
    let resolved = tokio::select! {
        biased;
        _ = token.cancelled() => return,
        res = resolving => res.unwrap_or_else(|panic| Err(JobError::panicked(panic))),
    };
    let _ = reports.send(Report::Resolved(resolved));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::ProcessFn;
    use crate::source::{PullFn, PullRef};

    fn double() -> ProcessRef<u32, u32> {
        ProcessFn::arc(|x: u32| async move { Ok::<_, JobError>(Some(x * 2)) })
    }

    #[tokio::test]
    async fn test_ready_item_reports_only_finished() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Report<u32, u32>>();
        run_job(JobId(1), Fetch::Ready(21), double(), tx).await;

        match rx.recv().await {
            Some(Report::Finished { id, outcome, .. }) => {
                assert_eq!(id, JobId(1));
                assert_eq!(outcome, Ok(Some(42)));
            }
            _ => panic!("expected Finished"),
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_exhausted_pull_reports_fetched_only() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Report<u32, u32>>();
        let pull: PullRef<u32> = PullFn::arc(|| async { Ok::<Option<u32>, JobError>(None) });
        run_job(JobId(2), Fetch::Pull(pull), double(), tx).await;

        assert!(matches!(rx.recv().await, Some(Report::Fetched { exhausted: true })));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_process_panic_becomes_job_error() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Report<u32, u32>>();
        let boom: ProcessRef<u32, u32> = ProcessFn::arc(|x: u32| async move {
            if x < 100 {
                panic!("kaboom");
            }
            Ok::<_, JobError>(Some(x))
        });
        run_job(JobId(3), Fetch::Ready(1), boom, tx).await;

        match rx.recv().await {
            Some(Report::Finished { outcome, .. }) => {
                assert_eq!(
                    outcome,
                    Err(JobError::Panicked {
                        info: "kaboom".into()
                    })
                );
            }
            _ => panic!("expected Finished"),
        }
    }

    #[tokio::test]
    async fn test_failed_pull_acknowledges_then_fails() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Report<u32, u32>>();
        let pull: PullRef<u32> = PullFn::arc(|| async { Err::<Option<u32>, _>(JobError::fail("down")) });
        run_job(JobId(4), Fetch::Pull(pull), double(), tx).await;

        assert!(matches!(rx.recv().await, Some(Report::Fetched { exhausted: false })));
        assert!(matches!(
            rx.recv().await,
            Some(Report::Finished { outcome: Err(JobError::Fail { .. }), .. })
        ));
    }

    #[tokio::test]
    async fn test_deferred_resolution_is_reported() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Report<u32, u32>>();
        let deferred = Box::pin(async { Ok::<_, JobError>(Source::sequence([1, 2])) });
        resolve_source(deferred, tx, CancellationToken::new()).await;

        assert!(matches!(
            rx.recv().await,
            Some(Report::Resolved(Ok(Source::Sequence(_))))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_resolution_drops_deferred_future() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Report<u32, u32>>();
        let guard = std::sync::Arc::new(());
        let held = std::sync::Arc::clone(&guard);
        let deferred = Box::pin(async move {
            let _held = held;
            futures::future::pending::<Result<Source<u32>, JobError>>().await
        });
        let token = CancellationToken::new();
        token.cancel();

        resolve_source(deferred, tx, token).await;

        assert_eq!(std::sync::Arc::strong_count(&guard), 1);
        assert!(rx.recv().await.is_none());
    }
}
