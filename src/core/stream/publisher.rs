//! Audio event publisher.
//!
//! [`AudioStreamPublisher`] owns an [`AudioChunkSource`] and hands it to one
//! subscription at a time. Subscribing again supersedes the previous
//! subscription, which is how a reconnect picks up the audio where the last
//! session stopped reading.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::source::AudioChunkSource;
use super::subscription::{DEFAULT_SHUTDOWN_TIMEOUT, Subscription, SubscriptionInner};
use crate::core::stt::{STTError, STTResult};

/// One chunk of audio wrapped for the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioEvent {
    sequence: u64,
    chunk: Bytes,
}

impl AudioEvent {
    pub fn new(sequence: u64, chunk: Bytes) -> Self {
        Self { sequence, chunk }
    }

    /// Zero-based position of this chunk within its subscription.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Raw audio bytes.
    pub fn chunk(&self) -> &Bytes {
        &self.chunk
    }

    pub fn into_chunk(self) -> Bytes {
        self.chunk
    }

    pub fn len(&self) -> usize {
        self.chunk.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunk.is_empty()
    }
}

/// Receiver of audio events.
///
/// Calls for one subscription never overlap: they all come from that
/// subscription's worker thread. `on_error` and `on_complete` are terminal and
/// mutually exclusive.
pub trait AudioSubscriber: Send + Sync {
    fn on_next(&self, event: AudioEvent);
    fn on_error(&self, error: STTError);
    fn on_complete(&self);
}

/// Publishes chunks of a single audio source to one subscriber at a time.
pub struct AudioStreamPublisher {
    source: Arc<Mutex<AudioChunkSource>>,
    current: Mutex<Option<Weak<SubscriptionInner>>>,
    next_id: AtomicU64,
    chunk_size: usize,
    shutdown_timeout: Duration,
}

impl AudioStreamPublisher {
    pub fn new(source: AudioChunkSource) -> Self {
        let chunk_size = source.chunk_size();
        Self {
            source: Arc::new(Mutex::new(source)),
            current: Mutex::new(None),
            next_id: AtomicU64::new(0),
            chunk_size,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Override how long a cancelled subscription waits for its worker.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Start a new subscription, cancelling the previous one if it is still alive.
    pub fn subscribe(&self, subscriber: Arc<dyn AudioSubscriber>) -> STTResult<Subscription> {
        let mut current = self.current.lock();
        if let Some(previous) = current.take().and_then(|weak| weak.upgrade()) {
            info!("Superseding previous audio subscription");
            // Reads stay serialized by the source lock, so there is no need to wait
            previous.cancel_detached();
        }

        let id = self.next_id.fetch_add(1, Ordering::AcqRel);
        let subscription = Subscription::start(
            id,
            self.source.clone(),
            subscriber,
            self.shutdown_timeout,
        )?;
        *current = Some(subscription.downgrade());
        debug!(subscription = id, "Audio subscription started");

        Ok(subscription)
    }

    /// Number of subscriptions created so far.
    pub fn subscription_count(&self) -> u64 {
        self.next_id.load(Ordering::Acquire)
    }

    /// Chunk size of the underlying source.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Whether the underlying source has been read to the end.
    ///
    /// Blocks while a worker is in the middle of a read.
    pub fn is_exhausted(&self) -> bool {
        self.source.lock().is_exhausted()
    }
}

impl std::fmt::Debug for AudioStreamPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStreamPublisher")
            .field("subscriptions", &self.subscription_count())
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish()
    }
}
