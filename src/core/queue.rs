//! # JobQueue: the public handle.
//!
//! [`JobQueue`] forwards lifecycle calls to the scheduler task as commands
//! and exposes read-only views of its state. Commands are processed in the
//! order they were sent, so `on(...)` registered before `start()` sees every
//! event of the run.
//!
//! ## Rules
//! - Lifecycle calls never block and never fail; calls that do not apply to
//!   the current status are ignored
//! - Dropping every clone of the handle stops the queue
//! - `wait()` resolves with the final snapshot once `processFinish` was emitted

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{broadcast, mpsc, watch};

use crate::{
    config::Config,
    core::{
        builder::JobQueueBuilder,
        scheduler::Command,
        state::{Snapshot, Status},
    },
    error::RuntimeError,
    events::{Bus, Event, EventKind},
};

/// Handle to a bounded-concurrency job runner.
pub struct JobQueue<T, R> {
    commands: mpsc::UnboundedSender<Command<R>>,
    state: watch::Receiver<Snapshot>,
    done: watch::Receiver<Option<Snapshot>>,
    running: Arc<AtomicUsize>,
    bus: Bus<R>,
    _item: PhantomData<fn() -> T>,
}

impl<T, R> Clone for JobQueue<T, R> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            state: self.state.clone(),
            done: self.done.clone(),
            running: Arc::clone(&self.running),
            bus: self.bus.clone(),
            _item: PhantomData,
        }
    }
}

impl<T, R> JobQueue<T, R>
where
    T: Send + 'static,
    R: fmt::Debug + Send + Sync + 'static,
{
    /// Starts building a queue with the given configuration.
    pub fn builder(cfg: Config) -> JobQueueBuilder<T, R> {
        JobQueueBuilder::new(cfg)
    }
}

impl<T, R> JobQueue<T, R> {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<Command<R>>,
        state: watch::Receiver<Snapshot>,
        done: watch::Receiver<Option<Snapshot>>,
        running: Arc<AtomicUsize>,
        bus: Bus<R>,
    ) -> Self {
        Self {
            commands,
            state,
            done,
            running,
            bus,
            _item: PhantomData,
        }
    }

    fn send(&self, cmd: Command<R>) -> &Self {
        let _ = self.commands.send(cmd);
        self
    }

    /// Starts dispatching (only from `Stopped`).
    pub fn start(&self) -> &Self {
        self.send(Command::Start)
    }

    /// Stops fetching new items; in-flight jobs complete.
    pub fn pause(&self) -> &Self {
        self.send(Command::Pause)
    }

    /// Continues dispatching after [`pause`](Self::pause); a no-op unless paused.
    pub fn resume(&self) -> &Self {
        self.send(Command::Resume)
    }

    /// Ends the queue for good: in-flight jobs drain, then `stop` and a final
    /// `processFinish` are emitted. Cancels a pending poll restart.
    pub fn stop(&self) -> &Self {
        self.send(Command::Stop)
    }

    /// Registers the handler for `kind`, replacing any earlier one.
    ///
    /// Handlers run synchronously on the scheduler task and must not block.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> &Self
    where
        F: Fn(&Event<R>) + Send + Sync + 'static,
    {
        self.send(Command::On(kind, Arc::new(handler)))
    }

    /// Number of jobs currently in flight.
    pub fn running_jobs_count(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Current lifecycle status.
    pub fn status(&self) -> Status {
        self.state.borrow().status
    }

    /// Current engine state.
    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    /// Subscribes to every event published from now on.
    ///
    /// The receiver is a raw broadcast receiver: if it falls more than
    /// [`Config::bus_capacity`](crate::Config::bus_capacity) events behind it
    /// observes `Lagged`. Use [`Subscribe`](crate::Subscribe) implementations
    /// for per-subscriber queues instead.
    pub fn subscribe(&self) -> broadcast::Receiver<Event<R>> {
        self.bus.subscribe()
    }

    /// Waits until the run is over and returns the final snapshot.
    ///
    /// With polling configured this only resolves after [`stop`](Self::stop).
    /// Subscriber workers have handled every queued event by the time it resolves.
    ///
    /// # Errors
    /// [`RuntimeError::Closed`] if the scheduler exited without finishing.
    pub async fn wait(&self) -> Result<Snapshot, RuntimeError> {
        let mut done = self.done.clone();
        let last = {
            let current = done
                .wait_for(Option::is_some)
                .await
                .map_err(|_| RuntimeError::Closed)?;
            (*current).clone()
        };
        last.ok_or(RuntimeError::Closed)
    }
}
