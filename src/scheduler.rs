//! Deferred execution for debounced and throttled highlight passes
//!
//! Nothing scheduled here is ever cancelled. Each job captures a [`Stamp`]
//! and compares it against its [`StampClock`] when it runs; a job whose stamp
//! was superseded does nothing.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Monotonic sequence value identifying one scheduled request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp(pub u64);

/// Issues stamps and tells whether a stamp is still the latest
#[derive(Debug, Default)]
pub struct StampClock {
    current: AtomicU64,
}

impl StampClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new stamp, superseding every earlier one
    pub fn advance(&self) -> Stamp {
        Stamp(self.current.fetch_add(1, AtomicOrdering::SeqCst) + 1)
    }

    pub fn current(&self) -> Stamp {
        Stamp(self.current.load(AtomicOrdering::SeqCst))
    }

    pub fn is_current(&self, stamp: Stamp) -> bool {
        self.current() == stamp
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

struct ScheduledJob {
    due: Instant,
    seq: u64,
    job: Job,
}

impl PartialEq for ScheduledJob {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for ScheduledJob {}

impl PartialOrd for ScheduledJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledJob {
    // Reversed so the BinaryHeap pops the earliest due job first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

enum WorkerMsg {
    Schedule(ScheduledJob),
    Shutdown,
}

/// Background thread running jobs after a delay, in due order
pub struct DeferredWorker {
    tx: Sender<WorkerMsg>,
    seq: AtomicU64,
    handle: Option<JoinHandle<()>>,
}

impl DeferredWorker {
    /// Spawn the worker thread
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel::<WorkerMsg>();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut queue: BinaryHeap<ScheduledJob> = BinaryHeap::new();
                loop {
                    let msg = match queue.peek().map(|job| job.due) {
                        Some(due) => {
                            let now = Instant::now();
                            if due <= now {
                                if let Some(ready) = queue.pop() {
                                    run_job(ready.job);
                                }
                                continue;
                            }
                            match rx.recv_timeout(due - now) {
                                Ok(msg) => msg,
                                Err(RecvTimeoutError::Timeout) => continue,
                                Err(RecvTimeoutError::Disconnected) => break,
                            }
                        }
                        None => match rx.recv() {
                            Ok(msg) => msg,
                            Err(_) => break,
                        },
                    };

                    match msg {
                        WorkerMsg::Schedule(job) => queue.push(job),
                        WorkerMsg::Shutdown => break,
                    }
                }
                tracing::debug!("Deferred worker exiting with {} pending jobs", queue.len());
            })?;

        Ok(Self {
            tx,
            seq: AtomicU64::new(0),
            handle: Some(handle),
        })
    }

    /// Run `job` on the worker after `delay`
    pub fn schedule<F>(&self, delay: Duration, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let scheduled = ScheduledJob {
            due: Instant::now() + delay,
            seq: self.seq.fetch_add(1, AtomicOrdering::Relaxed),
            job: Box::new(job),
        };
        if self.tx.send(WorkerMsg::Schedule(scheduled)).is_err() {
            tracing::warn!("Deferred worker is gone, dropping scheduled job");
        }
    }
}

impl Drop for DeferredWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerMsg::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_job(job: Job) {
    if catch_unwind(AssertUnwindSafe(job)).is_err() {
        tracing::error!("Deferred job panicked");
    }
}

/// Adaptive backoff for self-triggered passes
///
/// The delay before the next run is `max(min_delay, 2 × last run)`, with
/// `min_delay` read from the caller's current configuration. Only one run is
/// in flight at a time; a request that comes due while another run is in
/// flight is dropped, and only the latest request is honored.
#[derive(Debug, Default)]
pub struct AdaptiveThrottle {
    last_run: Mutex<Duration>,
    in_flight: AtomicBool,
    clock: StampClock,
}

impl AdaptiveThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay to wait before the next run
    pub fn next_delay(&self, min_delay: Duration) -> Duration {
        let last = self
            .last_run
            .lock()
            .map(|last| *last)
            .unwrap_or(Duration::ZERO);
        min_delay.max(last * 2)
    }

    /// Register a new request, superseding any pending one
    pub fn request(&self) -> Stamp {
        self.clock.advance()
    }

    /// Start a run for `stamp`, or `None` if it was superseded or another
    /// run is in flight
    ///
    /// The returned guard records the run's duration when dropped.
    pub fn try_begin(&self, stamp: Stamp) -> Option<ThrottleRun<'_>> {
        if !self.clock.is_current(stamp) {
            tracing::trace!("Throttled request {:?} superseded", stamp);
            return None;
        }
        if self.in_flight.swap(true, AtomicOrdering::SeqCst) {
            tracing::trace!("Throttled request {:?} dropped: run in flight", stamp);
            return None;
        }
        Some(ThrottleRun {
            throttle: self,
            started: Instant::now(),
        })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(AtomicOrdering::SeqCst)
    }

    /// Record the duration of a completed run
    pub fn record_run(&self, elapsed: Duration) {
        if let Ok(mut last) = self.last_run.lock() {
            *last = elapsed;
        }
    }
}

/// An in-flight throttled run
pub struct ThrottleRun<'a> {
    throttle: &'a AdaptiveThrottle,
    started: Instant,
}

impl Drop for ThrottleRun<'_> {
    fn drop(&mut self) {
        self.throttle.record_run(self.started.elapsed());
        self.throttle.in_flight.store(false, AtomicOrdering::SeqCst);
    }
}
