use std::sync::Arc;

use async_trait::async_trait;

use super::behavior::StreamTranscriptionBehavior;
use crate::core::stream::AudioStreamPublisher;
use crate::core::stt::{STTResult, StreamRequest};

/// A single streaming transcription attempt against a backend.
///
/// Implementations subscribe to `publisher`, send audio until it completes,
/// report `on_response` once the service accepts the stream and `on_stream`
/// per transcript event. The returned future resolves when the result stream
/// ends. Failures are returned, never reported through `behavior.on_error`.
#[async_trait]
pub trait StreamingTranscriber: Send + Sync {
    async fn stream_transcription(
        &self,
        request: &StreamRequest,
        publisher: &AudioStreamPublisher,
        behavior: Arc<dyn StreamTranscriptionBehavior>,
    ) -> STTResult<()>;

    /// Backend name for logs.
    fn provider_name(&self) -> &'static str {
        "unknown"
    }
}
