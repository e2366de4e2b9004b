//! # Example: sequence
//!
//! Doubles a fixed list of numbers with at most two jobs in flight.
//!
//! Shows how to:
//! - Build a [`JobQueue`] over a sequence source.
//! - Register single-slot handlers with [`JobQueue::on`].
//! - Pause and resume a run, then wait for the final snapshot.
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example sequence
//! ```

use std::time::Duration;

use jobq::{Config, EventKind, JobError, JobQueue};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config {
        max_concurrent: 2,
        debug: true,
        ..Config::default()
    };

    let queue: JobQueue<u64, u64> = JobQueue::builder(cfg)
        .with_source((1..=10).collect::<Vec<u64>>())
        .with_process_fn(|n: u64| async move {
            tokio::time::sleep(Duration::from_millis(50 * (n % 3 + 1))).await;
            if n == 7 {
                return Err(JobError::fail("seven is unlucky"));
            }
            Ok(Some(n * 2))
        })
        .build()?;

    queue
        .on(EventKind::JobFinish, |ev| {
            if let Some(rec) = &ev.record {
                println!("{} -> {:?} in {:?}", rec.id, rec.result, rec.elapsed());
            }
        })
        .on(EventKind::Error, |ev| {
            println!("failed: {}", ev.reason.as_deref().unwrap_or("unknown"));
        })
        .start();

    tokio::time::sleep(Duration::from_millis(120)).await;
    queue.pause();
    println!("paused with {} jobs still running", queue.running_jobs_count());
    tokio::time::sleep(Duration::from_millis(300)).await;
    queue.resume();

    let last = queue.wait().await?;
    println!(
        "done: status={} processed={} errors={}",
        last.status, last.processed, last.errors
    );
    Ok(())
}
