//! # Example: polling
//!
//! Drains a pull source, waits for the poll interval, and drains it again
//! until the queue is stopped.
//!
//! ## Flow
//! ```text
//! start ─► pull/process ... pull → None ─► Empty ─► Finished ─► Polling
//!                   ▲                                              │
//!                   └──────────────── poll interval ◄──────────────┘
//! stop ─► stop + processFinish
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=jobq=debug cargo run --example polling
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jobq::{Config, EventKind, JobError, JobQueue, Source};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Stands in for an external work table that fills up over time.
    let inbox = Arc::new(Mutex::new(VecDeque::from(["a".to_string(), "b".to_string()])));
    let reader = Arc::clone(&inbox);

    let cfg = Config {
        max_concurrent: 2,
        poll_interval: Some(Duration::from_millis(500)),
        ..Config::default()
    };

    let queue: JobQueue<String, usize> = JobQueue::builder(cfg)
        .with_source(Source::pull(move || {
            let reader = Arc::clone(&reader);
            async move {
                let next = reader
                    .lock()
                    .map_err(|_| JobError::fail("inbox lock poisoned"))?
                    .pop_front();
                Ok::<_, JobError>(next)
            }
        }))
        .with_process_fn(|msg: String| async move { Ok::<_, JobError>(Some(msg.len())) })
        .build()?;

    queue
        .on(EventKind::Polling, |ev| {
            println!("drained; next poll in {}ms", ev.delay_ms.unwrap_or_default());
        })
        .on(EventKind::JobFinish, |ev| println!("processed {:?}", ev.result()))
        .start();

    for batch in ["hello", "polling", "world"] {
        tokio::time::sleep(Duration::from_millis(700)).await;
        if let Ok(mut inbox) = inbox.lock() {
            inbox.push_back(batch.to_string());
        }
    }

    tokio::time::sleep(Duration::from_millis(700)).await;
    queue.stop();
    let last = queue.wait().await?;
    println!("stopped: processed={} status={}", last.processed, last.status);
    Ok(())
}
