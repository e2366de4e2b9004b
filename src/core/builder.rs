use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::{fmt, marker::PhantomData};

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    config::Config,
    core::{
        queue::JobQueue,
        scheduler::{Scheduler, Shared},
        state::Snapshot,
    },
    error::{ConfigError, JobError},
    events::Bus,
    jobs::{ProcessFn, ProcessRef},
    source::Source,
    subscribers::{LogWriter, Subscribe, SubscriberSet},
};

/// Builder for constructing a [`JobQueue`].
///
/// # Example
/// ```no_run
/// use jobq::{Config, JobError, JobQueue};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let queue: JobQueue<u32, u32> = JobQueue::builder(Config::default())
///     .with_source(vec![1, 2, 3])
///     .with_process_fn(|x: u32| async move { Ok::<_, JobError>(Some(x * 2)) })
///     .build()?;
///
/// queue.start();
/// let last = queue.wait().await?;
/// assert_eq!(last.processed, 3);
/// # Ok(())
/// # }
/// ```
pub struct JobQueueBuilder<T, R> {
    cfg: Config,
    source: Option<Source<T>>,
    process: Option<ProcessRef<T, R>>,
    subscribers: Vec<Arc<dyn Subscribe<R>>>,
    _item: PhantomData<fn() -> T>,
}

impl<T, R> JobQueueBuilder<T, R>
where
    T: Send + 'static,
    R: fmt::Debug + Send + Sync + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            source: None,
            process: None,
            subscribers: Vec::new(),
            _item: PhantomData,
        }
    }

    /// Sets the work source (a `Vec<T>` converts into a sequence).
    pub fn with_source(mut self, source: impl Into<Source<T>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the process function.
    pub fn with_process(mut self, process: ProcessRef<T, R>) -> Self {
        self.process = Some(process);
        self
    }

    /// Sets the process function from an async closure.
    pub fn with_process_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<R>, JobError>> + Send + 'static,
    {
        self.with_process(ProcessFn::arc(f))
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive every engine event through dedicated workers with
    /// bounded queues. The scheduler hands events to those queues directly, so
    /// a subscriber only misses events when its own queue overflows
    /// (reported as `SubscriberOverflow`).
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe<R>>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and spawns the scheduler.
    ///
    /// The queue stays `Stopped` until [`JobQueue::start`] is called.
    ///
    /// # Errors
    /// - [`ConfigError::ProcessRequired`] without a process function
    /// - [`ConfigError::SourceRequired`] without a source
    /// - [`ConfigError::PollingRequiresPullSource`] when polling is configured
    ///   for a sequence or stream source
    ///
    /// # Panics
    /// Must be called inside a tokio runtime.
    pub fn build(self) -> Result<JobQueue<T, R>, ConfigError> {
        let process = self.process.ok_or(ConfigError::ProcessRequired)?;
        let source = self.source.ok_or(ConfigError::SourceRequired)?;
        let kind = source.kind();
        if self.cfg.is_polling() && !kind.supports_polling() {
            return Err(ConfigError::PollingRequiresPullSource { kind });
        }

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let token = CancellationToken::new();

        let mut subscribers = self.subscribers;
        if self.cfg.debug {
            subscribers.push(Arc::new(LogWriter::new()));
        }
        let set = SubscriberSet::new(subscribers, bus.clone());
        let subscribers = (!set.is_empty()).then_some(set);
        if let Some(set) = &subscribers {
            debug!(subscribers = set.len(), "subscriber workers started");
        }

        let snapshot = Snapshot::new(self.cfg.max_concurrent, self.cfg.stop_on_error, kind);
        let (state_tx, state_rx) = watch::channel(snapshot);
        let (done_tx, done_rx) = watch::channel(None);
        let running = Arc::new(AtomicUsize::new(0));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (report_tx, report_rx) = mpsc::unbounded_channel();

        let scheduler = Scheduler::new(
            self.cfg,
            process,
            source,
            Shared {
                state: state_tx,
                done: done_tx,
                running: Arc::clone(&running),
            },
            bus.clone(),
            subscribers,
            report_tx,
            token,
        );
        tokio::spawn(scheduler.run(cmd_rx, report_rx));

        Ok(JobQueue::new(cmd_tx, state_rx, done_rx, running, bus))
    }
}
