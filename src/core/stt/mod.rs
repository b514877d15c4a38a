//! Speech-to-text backends and the types they share.

pub mod aws_transcribe;
mod base;
mod request;

pub use aws_transcribe::{
    AwsRegion, AwsTranscribeConfig, AwsTranscribeStreamer, MediaEncoding,
    PartialResultsStability, TranscriptEvent,
};
pub use base::{ErrorKind, STTError, STTResult};
pub use request::StreamRequest;
