//! # Example: stream_source
//!
//! Feeds a stream (and a deferred source resolving to one) into a queue with
//! unbounded concurrency; an error item fails only its own job.
//!
//! ## Run
//! ```bash
//! cargo run --example stream_source
//! ```

use std::time::Duration;

use futures::StreamExt;
use jobq::{Config, JobError, JobQueue, Source};
use tracing_subscriber::EnvFilter;

async fn run(label: &str, source: Source<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config {
        max_concurrent: 0,
        ..Config::default()
    };

    let queue: JobQueue<u32, String> = JobQueue::builder(cfg)
        .with_source(source)
        .with_process_fn(|n: u32| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, JobError>(Some(format!("record #{n}")))
        })
        .build()?;

    let mut events = queue.subscribe();
    queue.start();
    let last = queue.wait().await?;

    while let Ok(ev) = events.try_recv() {
        if let Some(result) = ev.result() {
            println!("[{label}] {result}");
        }
    }
    println!(
        "[{label}] source={} processed={} errors={}",
        last.source_kind, last.processed, last.errors
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let records = futures::stream::iter(1..=5u32).then(|n| async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if n == 3 {
            Err(JobError::fail("corrupt record"))
        } else {
            Ok(n)
        }
    });
    run("stream", Source::try_stream(records)).await?;

    let deferred = Source::deferred(async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(Source::stream(futures::stream::iter(10..13u32)))
    });
    run("deferred", deferred).await?;
    Ok(())
}
