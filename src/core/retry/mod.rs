//! Retrying streaming transcription.
//!
//! [`RetryingStreamClient`] drives a [`StreamingTranscriber`] through as many
//! attempts as its [`RetryConfig`] allows. Transient failures are hidden from
//! the caller's [`StreamTranscriptionBehavior`]; only the final outcome is
//! reported, exactly once.

mod behavior;
mod client;
mod policy;
mod transcriber;


pub use behavior::{StreamResponse, StreamTranscriptionBehavior};
pub use client::{RetryingStreamClient, StreamSummary};
pub use policy::{
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS, NonRetriableKinds, RetryClassifier, RetryConfig,
};
pub use transcriber::StreamingTranscriber;
