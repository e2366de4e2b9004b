//! # Example: custom_subscriber
//!
//! Demonstrates how to build and attach a custom event subscriber.
//!
//! Shows how to:
//! - Implement the [`Subscribe`] trait.
//! - Inspect [`Event`] / [`EventKind`] for job metrics.
//! - Wire the subscriber through [`JobQueueBuilder::with_subscribers`].
//!
//! ## Flow
//! ```text
//! Scheduler ──► SubscriberSet.emit(Event) ──► [queue] ──► Metrics.on_event()
//!     └─► Bus.publish(Event) ──► JobQueue::subscribe() receivers
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example custom_subscriber
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use jobq::{Config, Event, EventKind, JobError, JobQueue, Subscribe};

/// Collects simple counters; in real life this would export metrics.
#[derive(Default)]
struct Metrics {
    finished: AtomicU64,
    failed: AtomicU64,
    busy_ms: AtomicU64,
}

#[async_trait]
impl Subscribe<u32> for Metrics {
    async fn on_event(&self, ev: &Event<u32>) {
        match ev.kind {
            EventKind::JobFinish => {
                self.finished.fetch_add(1, Ordering::Relaxed);
                if let Some(rec) = &ev.record {
                    self.busy_ms
                        .fetch_add(rec.elapsed().as_millis() as u64, Ordering::Relaxed);
                }
            }
            EventKind::Error => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                println!(
                    "[metrics] {} failed: {}",
                    ev.job.map(|j| j.to_string()).unwrap_or_default(),
                    ev.reason.as_deref().unwrap_or("<none>")
                );
            }
            EventKind::ProcessFinish => {
                println!("[metrics] run finished: {:?}", ev.snapshot);
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "metrics"
    }

    fn queue_capacity(&self) -> usize {
        256
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::default());
    let cfg = Config {
        max_concurrent: 4,
        ..Config::default()
    };

    let queue: JobQueue<u32, u32> = JobQueue::builder(cfg)
        .with_source((1..=20).collect::<Vec<u32>>())
        .with_process_fn(|n: u32| async move {
            tokio::time::sleep(Duration::from_millis(u64::from(n) * 5)).await;
            if n % 6 == 0 {
                Err(JobError::fail(format!("{n} is divisible by six")))
            } else {
                Ok(Some(n * n))
            }
        })
        .with_subscribers(vec![metrics.clone() as Arc<dyn Subscribe<u32>>])
        .build()?;

    queue.start();
    queue.wait().await?;

    // Subscriber workers run on their own tasks; give them a moment to catch up.
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!(
        "finished={} failed={} busy={}ms",
        metrics.finished.load(Ordering::Relaxed),
        metrics.failed.load(Ordering::Relaxed),
        metrics.busy_ms.load(Ordering::Relaxed)
    );
    Ok(())
}
