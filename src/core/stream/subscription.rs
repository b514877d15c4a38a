//! Backpressure-aware subscription over an [`AudioChunkSource`].
//!
//! Every subscription owns one worker thread. The caller side only touches
//! atomics and a wake-up channel, so `request(n)` never blocks on I/O. All
//! subscriber signals (`on_next`, `on_error`, `on_complete`) are issued from
//! the worker thread, which keeps them strictly ordered.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU8, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::publisher::{AudioEvent, AudioSubscriber};
use super::source::AudioChunkSource;
use crate::core::stt::{STTError, STTResult};

/// How long `cancel()` waits for the worker before abandoning it.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

/// Lifecycle of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SubscriptionState {
    /// No outstanding demand.
    Idle = 0,
    /// Worker is delivering chunks to satisfy demand.
    Fulfilling = 1,
    /// Cancelled by the owner or superseded by a newer subscription.
    Cancelled = 2,
    /// Source exhausted and `on_complete` delivered.
    Completed = 3,
    /// `on_error` delivered.
    Failed = 4,
}

impl SubscriptionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Fulfilling,
            2 => Self::Cancelled,
            3 => Self::Completed,
            _ => Self::Failed,
        }
    }

    /// Whether no further signals can be delivered.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed | Self::Failed)
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Fulfilling => write!(f, "Fulfilling"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Message from the owner side to the worker.
enum WorkerSignal {
    /// Demand was added.
    Demand,
    /// A non-positive request was made.
    InvalidDemand(i64),
}

pub(crate) struct SubscriptionInner {
    id: u64,
    demand: AtomicI64,
    delivered: AtomicU64,
    state: AtomicU8,
    subscriber: Arc<dyn AudioSubscriber>,
    wake_tx: Mutex<Option<mpsc::UnboundedSender<WorkerSignal>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    finished: Mutex<bool>,
    finished_cv: Condvar,
    shutdown_timeout: Duration,
}

impl SubscriptionInner {
    fn state(&self) -> SubscriptionState {
        SubscriptionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move into a terminal state. Returns `false` if already terminal, which
    /// is what guarantees a single terminal signal.
    fn terminate(&self, to: SubscriptionState) -> bool {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if SubscriptionState::from_u8(current).is_terminal() {
                    None
                } else {
                    Some(to as u8)
                }
            })
            .is_ok()
    }

    /// Deliver chunks while demand is positive. Returns `false` when the
    /// worker should exit.
    fn drain(&self, source: &Mutex<AudioChunkSource>) -> bool {
        loop {
            if self.state().is_terminal() {
                return false;
            }

            if self.demand.load(Ordering::SeqCst) <= 0 {
                let _ = self.state.compare_exchange(
                    SubscriptionState::Fulfilling as u8,
                    SubscriptionState::Idle as u8,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                );
                // request() may have added demand while its own swap saw Fulfilling
                if self.demand.load(Ordering::SeqCst) <= 0 {
                    return true;
                }
                let _ = self.state.compare_exchange(
                    SubscriptionState::Idle as u8,
                    SubscriptionState::Fulfilling as u8,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                );
                continue;
            }

            let next = source.lock().next_chunk();
            match next {
                Ok(Some(chunk)) => {
                    // Cancellation may have landed while we were blocked on the read
                    if self.state().is_terminal() {
                        return false;
                    }
                    self.demand.fetch_sub(1, Ordering::AcqRel);
                    let sequence = self.delivered.fetch_add(1, Ordering::AcqRel);
                    self.subscriber.on_next(AudioEvent::new(sequence, chunk));
                }
                Ok(None) => {
                    if self.terminate(SubscriptionState::Completed) {
                        debug!(
                            subscription = self.id,
                            delivered = self.delivered.load(Ordering::Acquire),
                            "Audio source exhausted"
                        );
                        self.subscriber.on_complete();
                    }
                    return false;
                }
                Err(e) => {
                    if self.terminate(SubscriptionState::Failed) {
                        warn!(subscription = self.id, "Audio source failed: {}", e);
                        self.subscriber.on_error(e);
                    }
                    return false;
                }
            }
        }
    }

    fn run_worker(
        self: Arc<Self>,
        source: Arc<Mutex<AudioChunkSource>>,
        mut wake_rx: mpsc::UnboundedReceiver<WorkerSignal>,
    ) {
        debug!(subscription = self.id, "Audio publisher worker started");
        while let Some(signal) = wake_rx.blocking_recv() {
            match signal {
                WorkerSignal::Demand => {
                    if !self.drain(&source) {
                        break;
                    }
                }
                WorkerSignal::InvalidDemand(n) => {
                    if self.terminate(SubscriptionState::Failed) {
                        warn!(subscription = self.id, "Rejected non-positive demand {}", n);
                        self.subscriber.on_error(STTError::InvalidDemand(n));
                    }
                    break;
                }
            }
        }

        // Stop accepting demand once the worker is gone
        self.wake_tx.lock().take();
        *self.finished.lock() = true;
        self.finished_cv.notify_all();
        debug!(subscription = self.id, "Audio publisher worker stopped");
    }

    /// Mark the subscription cancelled and wake the worker so it exits.
    fn stop(&self) {
        if self.terminate(SubscriptionState::Cancelled) {
            debug!(subscription = self.id, "Subscription cancelled");
        }
        // Closing the channel wakes a worker parked in blocking_recv
        self.wake_tx.lock().take();
    }

    /// Cancel without waiting for the worker.
    ///
    /// A worker blocked in a read finishes it in the background and drops the
    /// chunk. Safe to call from async code.
    pub(crate) fn cancel_detached(&self) {
        self.stop();
        // Dropping the handle detaches the thread
        if self.worker.lock().take().is_some() {
            debug!(subscription = self.id, "Audio publisher worker detached");
        }
    }

    pub(crate) fn cancel(&self) {
        self.stop();

        let Some(handle) = self.worker.lock().take() else {
            return;
        };

        // Cancelled from inside a subscriber callback: the worker exits on its own
        if handle.thread().id() == thread::current().id() {
            return;
        }

        let mut finished = self.finished.lock();
        let timed_out = self
            .finished_cv
            .wait_while_for(&mut finished, |done| !*done, self.shutdown_timeout)
            .timed_out();
        drop(finished);

        if timed_out {
            warn!(
                subscription = self.id,
                "Audio publisher worker did not stop within {:?}, abandoning it",
                self.shutdown_timeout
            );
        } else if handle.join().is_err() {
            warn!(subscription = self.id, "Audio publisher worker panicked");
        }
    }
}

/// Handle to an active subscription.
///
/// The owner drives delivery with [`request`](Self::request) and stops it with
/// [`cancel`](Self::cancel). Dropping the handle cancels the subscription
/// without waiting for the worker.
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

impl Subscription {
    pub(crate) fn start(
        id: u64,
        source: Arc<Mutex<AudioChunkSource>>,
        subscriber: Arc<dyn AudioSubscriber>,
        shutdown_timeout: Duration,
    ) -> STTResult<Self> {
        let (wake_tx, wake_rx) = mpsc::unbounded_channel();
        let inner = Arc::new(SubscriptionInner {
            id,
            demand: AtomicI64::new(0),
            delivered: AtomicU64::new(0),
            state: AtomicU8::new(SubscriptionState::Idle as u8),
            subscriber,
            wake_tx: Mutex::new(Some(wake_tx)),
            worker: Mutex::new(None),
            finished: Mutex::new(false),
            finished_cv: Condvar::new(),
            shutdown_timeout,
        });

        let worker_inner = inner.clone();
        let handle = thread::Builder::new()
            .name(format!("audio-publisher-{id}"))
            .spawn(move || worker_inner.run_worker(source, wake_rx))
            .map_err(|e| {
                STTError::AudioSource(format!("Failed to spawn publisher worker: {}", e))
            })?;
        *inner.worker.lock() = Some(handle);

        Ok(Self { inner })
    }

    pub(crate) fn downgrade(&self) -> std::sync::Weak<SubscriptionInner> {
        Arc::downgrade(&self.inner)
    }

    /// Request `n` more chunks.
    ///
    /// Returns immediately; chunks are delivered from the worker thread. A
    /// non-positive `n` is reported to the subscriber through `on_error`,
    /// which terminates the subscription without touching the demand counter.
    pub fn request(&self, n: i64) {
        let inner = &self.inner;
        if inner.state().is_terminal() {
            debug!(subscription = inner.id, "Ignoring request on finished subscription");
            return;
        }

        let signal = if n <= 0 {
            WorkerSignal::InvalidDemand(n)
        } else {
            let _ = inner
                .demand
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| {
                    Some(d.saturating_add(n))
                });
            let _ = inner.state.compare_exchange(
                SubscriptionState::Idle as u8,
                SubscriptionState::Fulfilling as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            );
            WorkerSignal::Demand
        };

        if let Some(tx) = inner.wake_tx.lock().as_ref() {
            let _ = tx.send(signal);
        }
    }

    /// Cancel the subscription.
    ///
    /// Waits up to the shutdown timeout for an in-flight chunk to finish.
    /// After this returns, no further events reach the subscriber.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Numeric id, unique per publisher.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SubscriptionState {
        self.inner.state()
    }

    /// Chunks requested but not yet delivered.
    pub fn outstanding_demand(&self) -> i64 {
        self.inner.demand.load(Ordering::Acquire)
    }

    /// Chunks delivered so far.
    pub fn delivered(&self) -> u64 {
        self.inner.delivered.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .field("outstanding_demand", &self.outstanding_demand())
            .field("delivered", &self.delivered())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Drops happen on async tasks, so never wait for the worker here
        self.inner.cancel_detached();
    }
}
