//! Amazon Transcribe Streaming backend.
//!
//! Transcribes audio from an [`AudioStreamPublisher`](crate::core::stream::AudioStreamPublisher)
//! through the AWS SDK's bidirectional event stream. One call to
//! [`AwsTranscribeStreamer`]'s `stream_transcription` is one attempt; wrap the
//! streamer in a [`RetryingStreamClient`](crate::core::retry::RetryingStreamClient)
//! to survive transient failures.
//!
//! # Authentication
//!
//! AWS credentials can be provided via:
//! 1. `aws_access_key_id` / `aws_secret_access_key` in [`AwsTranscribeConfig`]
//! 2. Environment variables: `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`
//! 3. AWS credentials file (`~/.aws/credentials`)
//! 4. IAM instance profiles (for EC2/ECS/Lambda)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use waav_transcribe::core::retry::RetryingStreamClient;
//! use waav_transcribe::core::stream::{AudioChunkSource, AudioStreamPublisher};
//! use waav_transcribe::core::stt::StreamRequest;
//! use waav_transcribe::core::stt::aws_transcribe::{AwsTranscribeConfig, AwsTranscribeStreamer, MediaEncoding};
//!
//! let streamer = AwsTranscribeStreamer::new(AwsTranscribeConfig::default())?;
//! let client = RetryingStreamClient::new(streamer);
//! let publisher = AudioStreamPublisher::new(AudioChunkSource::open("call.wav", 3200)?);
//! let request = StreamRequest::new("en-US", MediaEncoding::Pcm, 16000);
//! let summary = client
//!     .start_stream_transcription(&request, &publisher, Arc::new(MyBehavior))
//!     .await?;
//! ```
//!
//! # Limitations
//!
//! - Maximum session duration: 4 hours
//! - One stream per HTTP/2 session
//! - PCM audio must be 16-bit signed little-endian

mod client;
mod config;
mod messages;


pub use client::AwsTranscribeStreamer;
pub use config::{
    AwsRegion, AwsTranscribeConfig, FALLBACK_LANGUAGE_CODE, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE,
    MediaEncoding, PartialResultsStability, RECOMMENDED_SAMPLE_RATE,
};
pub use messages::{Alternative, TranscriptEvent, TranscriptItem, TranscriptResult};
