//! `futures::Stream` view over a subscription.
//!
//! The stream requests a fixed window of chunks up front and one more for
//! every chunk the consumer takes, so at most `window` chunks are ever
//! buffered between the worker thread and the async consumer.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tracing::debug;

use super::publisher::{AudioEvent, AudioStreamPublisher, AudioSubscriber};
use super::subscription::Subscription;
use crate::core::stt::{STTError, STTResult};

/// Default number of chunks kept in flight.
pub const DEFAULT_REQUEST_WINDOW: usize = 8;

enum Signal {
    Next(AudioEvent),
    Error(STTError),
    Complete,
}

struct ChannelSubscriber {
    tx: mpsc::UnboundedSender<Signal>,
}

impl AudioSubscriber for ChannelSubscriber {
    fn on_next(&self, event: AudioEvent) {
        let _ = self.tx.send(Signal::Next(event));
    }

    fn on_error(&self, error: STTError) {
        let _ = self.tx.send(Signal::Error(error));
    }

    fn on_complete(&self) {
        let _ = self.tx.send(Signal::Complete);
    }
}

/// Stream of audio events backed by a publisher subscription.
///
/// Yields `Ok(event)` per chunk, a single `Err` if the source fails, and ends
/// after completion. Dropping the stream cancels the subscription.
pub struct AudioEventStream {
    rx: mpsc::UnboundedReceiver<Signal>,
    subscription: Subscription,
    done: bool,
}

impl AudioEventStream {
    /// Subscribe to `publisher` with `window` chunks of read-ahead.
    pub fn subscribe(publisher: &AudioStreamPublisher, window: usize) -> STTResult<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = publisher.subscribe(Arc::new(ChannelSubscriber { tx }))?;
        let window = window.max(1) as i64;
        subscription.request(window);
        debug!(
            subscription = subscription.id(),
            window, "Audio event stream subscribed"
        );

        Ok(Self {
            rx,
            subscription,
            done: false,
        })
    }

    /// The subscription feeding this stream.
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }
}

impl Stream for AudioEventStream {
    type Item = STTResult<AudioEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(Signal::Next(event))) => {
                this.subscription.request(1);
                Poll::Ready(Some(Ok(event)))
            }
            Poll::Ready(Some(Signal::Error(error))) => {
                this.done = true;
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(Some(Signal::Complete)) | Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
