pub mod retry;
pub mod stream;
pub mod stt;

pub use retry::{
    RetryConfig, RetryingStreamClient, StreamResponse, StreamSummary,
    StreamTranscriptionBehavior, StreamingTranscriber,
};
pub use stream::{AudioChunkSource, AudioEventStream, AudioStreamPublisher};
pub use stt::{ErrorKind, STTError, STTResult, StreamRequest, TranscriptEvent};
