//! Backpressure-aware audio publishing.
//!
//! The pieces, leaf first:
//!
//! - [`AudioChunkSource`]: blocking reader cut into fixed-size chunks
//! - [`AudioStreamPublisher`]: hands the source to one [`Subscription`] at a time
//! - [`Subscription`]: `request(n)` / `cancel()` handle with a dedicated worker thread
//! - [`AudioEventStream`]: the subscription as a `futures::Stream`
//!
//! # Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use waav_transcribe::core::stream::{AudioChunkSource, AudioEventStream, AudioStreamPublisher};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = AudioChunkSource::open("speech.wav", 1024)?;
//! let publisher = AudioStreamPublisher::new(source);
//! let mut events = AudioEventStream::subscribe(&publisher, 8)?;
//! while let Some(event) = events.next().await {
//!     let event = event?;
//!     println!("chunk {} ({} bytes)", event.sequence(), event.len());
//! }
//! # Ok(())
//! # }
//! ```

mod event_stream;
mod publisher;
mod source;
mod subscription;


pub use event_stream::{AudioEventStream, DEFAULT_REQUEST_WINDOW};
pub use publisher::{AudioEvent, AudioStreamPublisher, AudioSubscriber};
pub use source::{AudioChunkSource, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use subscription::{DEFAULT_SHUTDOWN_TIMEOUT, Subscription, SubscriptionState};
