//! Caller-facing callbacks for a streaming transcription.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::stt::{STTError, TranscriptEvent};

/// Initial response of one streaming attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamResponse {
    /// Session id acknowledged by the service
    pub session_id: Option<String>,
    /// Zero-based attempt that produced this response
    pub attempt: u32,
}

/// Receives the results of a streaming transcription.
///
/// `on_response` and `on_stream` fire for every attempt, `on_error` and
/// `on_complete` exactly once for the whole operation.
pub trait StreamTranscriptionBehavior: Send + Sync {
    /// The service accepted a stream.
    fn on_response(&self, response: &StreamResponse);

    /// A transcript event arrived.
    fn on_stream(&self, event: TranscriptEvent);

    /// The operation failed for good.
    fn on_error(&self, error: &STTError);

    /// The operation finished successfully.
    fn on_complete(&self);
}

/// Wraps the caller's behavior for a single attempt.
///
/// Forwards responses and transcript events; swallows the per-attempt error
/// and completion hooks so a transient failure never reaches the caller.
pub(crate) struct AttemptBehavior {
    inner: Arc<dyn StreamTranscriptionBehavior>,
    attempt: u32,
}

impl AttemptBehavior {
    pub(crate) fn new(inner: Arc<dyn StreamTranscriptionBehavior>, attempt: u32) -> Self {
        Self { inner, attempt }
    }
}

impl StreamTranscriptionBehavior for AttemptBehavior {
    fn on_response(&self, response: &StreamResponse) {
        let response = StreamResponse {
            attempt: self.attempt,
            ..response.clone()
        };
        self.inner.on_response(&response);
    }

    fn on_stream(&self, event: TranscriptEvent) {
        self.inner.on_stream(event);
    }

    fn on_error(&self, error: &STTError) {
        debug!(attempt = self.attempt, "Suppressed per-attempt error: {}", error);
    }

    fn on_complete(&self) {
        debug!(attempt = self.attempt, "Suppressed per-attempt completion");
    }
}
