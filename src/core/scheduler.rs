//! # Scheduler: the single owner of engine state.
//!
//! The scheduler is one task that exclusively owns the source, counters,
//! status, pause flag and handlers. The [`JobQueue`](crate::JobQueue) handle
//! talks to it through [`Command`]s; spawned jobs talk to it through
//! [`Report`]s. Messages are handled one at a time, so a dispatch pass can
//! never re-enter itself.
//!
//! ## Architecture
//! ```text
//! JobQueue ── Command ──┐
//!                       ▼
//!                 Scheduler::run() ── fill_jobs() ──► spawn runner::run_job()
//!                       ▲                                     │
//!   poll deadline ──────┤                                     │
//!                       └──────────── Report ◄────────────────┘
//! ```
//!
//! ## Rules
//! - `fill_jobs` dispatches while: not paused, not stopping, status `Running`,
//!   below the concurrency limit and the source has items
//! - Unbounded concurrency over a pull or stream source keeps **one** fetch outstanding
//! - The running count is decremented exactly once per dispatched job
//! - A drained run (`Empty`, `Error` or stopping with nothing running) triggers finish
//! - Finish either polls (pull-capable source, polling configured, not stopping,
//!   no resolution failure) or publishes the final `processFinish` snapshot
//! - `stop` is announced only once in-flight jobs drained, right before `processFinish`
//! - Every event reaches the subscriber set directly; the broadcast bus only
//!   serves raw [`JobQueue::subscribe`](crate::JobQueue::subscribe) receivers
//! - The `done` snapshot is published after subscriber workers drained

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::Config;
use crate::core::runner;
use crate::core::state::{Snapshot, Status};
use crate::error::{JobError, RuntimeError, panic_message};
use crate::events::{Bus, Event, EventKind};
use crate::jobs::{JobId, JobRecord, ProcessRef};
use crate::source::{ActiveSource, Fetch, Source};
use crate::subscribers::SubscriberSet;

/// Single-slot event handler registered through [`JobQueue::on`](crate::JobQueue::on).
pub(crate) type Handler<R> = Arc<dyn Fn(&Event<R>) + Send + Sync>;

/// Requests sent by the handle.
pub(crate) enum Command<R> {
    Start,
    Pause,
    Resume,
    Stop,
    On(EventKind, Handler<R>),
}

/// Progress sent by resolution and job tasks.
pub(crate) enum Report<T, R> {
    /// A deferred source resolved.
    Resolved(Result<Source<T>, JobError>),
    /// An asynchronous fetch completed; `exhausted` ends that job without processing.
    Fetched { exhausted: bool },
    /// A job with an item completed.
    Finished {
        id: JobId,
        started_at: SystemTime,
        ended_at: SystemTime,
        outcome: Result<Option<R>, JobError>,
    },
}

/// Shared views the scheduler writes and the handle reads.
pub(crate) struct Shared {
    pub(crate) state: watch::Sender<Snapshot>,
    pub(crate) done: watch::Sender<Option<Snapshot>>,
    pub(crate) running: Arc<AtomicUsize>,
}

pub(crate) struct Scheduler<T, R> {
    cfg: Config,
    process: ProcessRef<T, R>,
    /// Configured source, taken on `start()`.
    pending: Option<Source<T>>,
    /// Resolved source; `None` before start and while a deferred source resolves.
    source: Option<ActiveSource<T>>,
    shared: Shared,
    bus: Bus<R>,
    subscribers: Option<SubscriberSet<R>>,
    reports: mpsc::UnboundedSender<Report<T, R>>,
    handlers: HashMap<EventKind, Handler<R>>,
    token: CancellationToken,

    paused: bool,
    halted: bool,
    finished: bool,
    pending_fetches: usize,
    next_id: u64,
    poll_deadline: Option<Instant>,
}

impl<T, R> Scheduler<T, R>
where
    T: Send + 'static,
    R: Send + Sync + 'static,
{
    pub(crate) fn new(
        cfg: Config,
        process: ProcessRef<T, R>,
        source: Source<T>,
        shared: Shared,
        bus: Bus<R>,
        subscribers: Option<SubscriberSet<R>>,
        reports: mpsc::UnboundedSender<Report<T, R>>,
        token: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            process,
            pending: Some(source),
            source: None,
            shared,
            bus,
            subscribers,
            reports,
            handlers: HashMap::new(),
            token,
            paused: false,
            halted: false,
            finished: false,
            pending_fetches: 0,
            next_id: 0,
            poll_deadline: None,
        }
    }

    /// Main loop: handles commands, reports and the poll deadline until the run is over.
    ///
    /// Dropping every handle closes the command channel, which acts as `stop()`.
    pub(crate) async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command<R>>,
        mut reports: mpsc::UnboundedReceiver<Report<T, R>>,
    ) {
        let mut open = true;

        while !self.finished {
            let deadline = self.poll_deadline;
            tokio::select! {
                cmd = commands.recv(), if open => match cmd {
                    Some(cmd) => self.on_command(cmd),
                    None => {
                        open = false;
                        debug!("all queue handles dropped; stopping");
                        self.stop();
                    }
                },
                Some(report) = reports.recv() => self.on_report(report),
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.restart_after_poll();
                }
            }
        }

        self.token.cancel();
        if let Some(set) = self.subscribers.take() {
            set.shutdown().await;
        }
        let snapshot = self.snapshot();
        self.shared.done.send_replace(Some(snapshot));
    }

    fn on_command(&mut self, cmd: Command<R>) {
        match cmd {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Stop => self.stop(),
            Command::On(kind, handler) => {
                self.handlers.insert(kind, handler);
            }
        }
    }

    fn on_report(&mut self, report: Report<T, R>) {
        match report {
            Report::Resolved(resolved) => self.on_resolved(resolved),
            Report::Fetched { exhausted } => {
                self.pending_fetches = self.pending_fetches.saturating_sub(1);
                if exhausted {
                    if matches!(self.status(), Status::Running | Status::Paused) {
                        self.set_status(Status::Empty);
                    }
                    self.next();
                } else {
                    self.fill_jobs();
                }
            }
            Report::Finished {
                id,
                started_at,
                ended_at,
                outcome,
            } => {
                self.on_finished(id, started_at, ended_at, outcome);
                self.next();
            }
        }
    }

    // === Lifecycle ===

    fn start(&mut self) {
        if self.status() != Status::Stopped || self.halted {
            debug!(status = %self.status(), "start ignored");
            return;
        }
        let Some(source) = self.pending.take() else {
            return;
        };

        let now = SystemTime::now();
        self.shared.state.send_modify(|s| {
            s.start_time = Some(now);
            s.status = Status::Running;
        });
        self.emit(Event::new(EventKind::Start).with_snapshot(self.snapshot()));
        self.init(source);
    }

    fn pause(&mut self) {
        if self.paused || self.halted || self.finished || self.status() == Status::Stopped {
            return;
        }
        self.paused = true;
        if matches!(self.status(), Status::Running | Status::Polling) {
            self.set_status(Status::Paused);
        }
        self.emit(Event::new(EventKind::Pause).with_snapshot(self.snapshot()));
    }

    fn resume(&mut self) {
        if !self.paused || self.halted || self.finished {
            return;
        }
        self.paused = false;
        if self.status() == Status::Paused {
            let next = if self.poll_deadline.is_some() {
                Status::Polling
            } else {
                Status::Running
            };
            self.set_status(next);
        }
        self.emit(Event::new(EventKind::Resume).with_snapshot(self.snapshot()));
        self.fill_jobs();
    }

    fn stop(&mut self) {
        if self.halted || self.finished {
            return;
        }
        self.halted = true;
        self.poll_deadline = None;
        debug!(running = self.running(), "stop requested; draining");

        if self.running() == 0 {
            self.finish(None);
        }
    }

    /// Installs the source, resolving a deferred one first.
    fn init(&mut self, source: Source<T>) {
        match source {
            Source::Deferred(fut) => {
                debug!("resolving deferred source");
                tokio::spawn(runner::resolve_source(
                    fut,
                    self.reports.clone(),
                    self.token.clone(),
                ));
            }
            Source::Sequence(items) => self.activate(ActiveSource::Sequence(items)),
            Source::Pull(pull) => self.activate(ActiveSource::Pull(pull)),
            Source::Stream(stream) => self.activate(ActiveSource::stream(stream)),
        }
    }

    fn on_resolved(&mut self, resolved: Result<Source<T>, JobError>) {
        if self.finished || self.halted {
            return;
        }
        match resolved {
            Err(error) => {
                let reason = match error {
                    JobError::Fail { error } => error,
                    other => other.to_string(),
                };
                self.finish(Some(RuntimeError::SourceInvalid { reason }));
            }
            Ok(Source::Deferred(fut)) => {
                debug!("deferred source resolved to another deferred source");
                tokio::spawn(runner::resolve_source(
                    fut,
                    self.reports.clone(),
                    self.token.clone(),
                ));
            }
            Ok(source) => {
                let kind = source.kind();
                if self.cfg.is_polling() && !kind.supports_polling() {
                    self.shared.state.send_modify(|s| s.source_kind = kind);
                    self.finish(Some(RuntimeError::PollingRequiresPullSource { kind }));
                    return;
                }
                debug!(kind = %kind, "deferred source resolved");
                self.init(source);
            }
        }
    }

    fn activate(&mut self, source: ActiveSource<T>) {
        let kind = source.kind();
        let empty = !source.has_items();
        self.shared.state.send_modify(|s| s.source_kind = kind);
        self.source = Some(source);

        if empty {
            self.set_status(Status::Empty);
            self.finish(None);
            return;
        }
        self.fill_jobs();
    }

    // === Dispatch ===

    fn can_dispatch(&self) -> bool {
        let Some(source) = &self.source else {
            return false;
        };
        if self.paused || self.halted || self.status() != Status::Running || !source.has_items() {
            return false;
        }
        match self.cfg.concurrency_limit() {
            Some(limit) => self.running() < limit,
            None => !source.is_async() || self.pending_fetches == 0,
        }
    }

    /// Dispatches jobs until capacity, status or the source stops it.
    fn fill_jobs(&mut self) {
        while self.can_dispatch() {
            self.emit(Event::new(EventKind::JobFetch).with_running(self.running()));

            let Some(source) = self.source.as_mut() else {
                break;
            };
            let Some(fetch) = source.next_fetch() else {
                break;
            };
            let drained = !source.has_items();

            if drained {
                self.set_status(Status::Empty);
            }
            if fetch.is_async() {
                self.pending_fetches += 1;
            }
            self.run_job(fetch);
        }
    }

    fn run_job(&mut self, fetch: Fetch<T>) {
        self.shared.running.fetch_add(1, Ordering::SeqCst);
        self.next_id += 1;
        let id = JobId(self.next_id);

        self.emit(Event::new(EventKind::JobRun).with_job(id));
        tokio::spawn(runner::run_job(
            id,
            fetch,
            Arc::clone(&self.process),
            self.reports.clone(),
        ));
    }

    fn on_finished(
        &mut self,
        id: JobId,
        started_at: SystemTime,
        ended_at: SystemTime,
        outcome: Result<Option<R>, JobError>,
    ) {
        // The slot is released in `next`, so the count still includes this job.
        let running = self.running();
        match outcome {
            Ok(Some(result)) => {
                self.shared.state.send_modify(|s| s.processed += 1);
                self.emit(Event::new(EventKind::JobFinish).with_record(JobRecord {
                    id,
                    started_at,
                    ended_at,
                    result: Arc::new(result),
                    running,
                }));
            }
            Ok(None) => {}
            Err(error) => {
                debug!(job = %id, process = self.process.name(), %error, "job failed");
                self.shared.state.send_modify(|s| s.errors += 1);
                self.emit(
                    Event::new(EventKind::Error)
                        .with_job(id)
                        .with_running(running)
                        .with_reason(error.to_string())
                        .with_label(error.as_label()),
                );
                if self.cfg.stop_on_error && !self.finished {
                    debug!(job = %id, "stopping dispatch after job error");
                    self.set_status(Status::Error);
                }
            }
        }
    }

    /// Releases one running slot, then finishes or keeps dispatching.
    fn next(&mut self) {
        let running = self.release_slot();
        let drained = matches!(self.status(), Status::Empty | Status::Error) || self.halted;

        if running == 0 && drained {
            self.finish(None);
        } else {
            self.fill_jobs();
        }
    }

    /// Ends the current run: polls again later or publishes the final snapshot.
    fn finish(&mut self, error: Option<RuntimeError>) {
        if self.finished {
            return;
        }

        let poll = match &error {
            Some(_) => None,
            None if self.halted => None,
            None => self.cfg.poll_interval,
        };

        match error {
            Some(error) => {
                warn!(label = error.as_label(), %error, "run failed");
                self.set_status(Status::Error);
                self.emit(
                    Event::new(EventKind::Error)
                        .with_reason(error.to_string())
                        .with_label(error.as_label()),
                );
            }
            None => self.set_status(Status::Finished),
        }

        match poll {
            Some(delay) => {
                self.set_status(Status::Polling);
                self.poll_deadline = Some(Instant::now() + delay);
                self.emit(
                    Event::new(EventKind::Polling)
                        .with_snapshot(self.snapshot())
                        .with_delay(delay),
                );
            }
            None => {
                self.finished = true;
                let snapshot = self.snapshot().with_end_time(SystemTime::now());
                self.shared.state.send_replace(snapshot.clone());
                if self.halted {
                    self.emit(Event::new(EventKind::Stop).with_snapshot(snapshot.clone()));
                }
                self.emit(Event::new(EventKind::ProcessFinish).with_snapshot(snapshot));
            }
        }
    }

    fn restart_after_poll(&mut self) {
        self.poll_deadline = None;
        if self.halted || self.finished {
            return;
        }
        if self.paused {
            debug!("poll delay elapsed while paused");
            self.set_status(Status::Paused);
            return;
        }
        debug!("poll delay elapsed; restarting dispatch");
        self.set_status(Status::Running);
        self.fill_jobs();
    }

    // === State helpers ===

    fn status(&self) -> Status {
        self.shared.state.borrow().status
    }

    fn set_status(&self, status: Status) {
        self.shared.state.send_modify(|s| s.status = status);
    }

    fn snapshot(&self) -> Snapshot {
        self.shared.state.borrow().clone()
    }

    fn running(&self) -> usize {
        self.shared.running.load(Ordering::SeqCst)
    }

    fn release_slot(&self) -> usize {
        let prev = self
            .shared
            .running
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .unwrap_or(0);
        prev.saturating_sub(1)
    }

    /// Invokes the registered handler (panics isolated), then publishes the event.
    fn emit(&self, event: Event<R>) {
        if let Some(handler) = self.handlers.get(&event.kind) {
            let call = std::panic::catch_unwind(AssertUnwindSafe(|| handler(&event)));
            if let Err(panic) = call {
                let info = panic_message(panic.as_ref());
                warn!(event = event.kind.as_str(), %info, "event handler panicked");
                self.publish(Event::subscriber_panicked("handler", info));
            }
        }
        self.publish(event);
    }

    /// Hands the event to the subscriber queues, then to raw bus receivers.
    fn publish(&self, event: Event<R>) {
        if let Some(set) = &self.subscribers {
            set.emit(&event);
        }
        self.bus.publish(event);
    }
}
