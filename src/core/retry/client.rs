//! Retrying wrapper around a streaming transcriber.
//!
//! One call to [`RetryingStreamClient::start_stream_transcription`] is one
//! logical transcription: a fresh session id, up to `max_retries + 1` attempts
//! with a fixed delay in between, and exactly one terminal callback on the
//! caller's behavior.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::behavior::{AttemptBehavior, StreamTranscriptionBehavior};
use super::policy::{RetryClassifier, RetryConfig};
use super::transcriber::StreamingTranscriber;
use crate::core::stream::AudioStreamPublisher;
use crate::core::stt::{STTError, STTResult, StreamRequest};

/// Outcome of a successful transcription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    /// Session id shared by every attempt
    pub session_id: String,
    /// Number of attempts made, including the successful one
    pub attempts: u32,
}

/// Streaming transcription client that retries transient failures.
pub struct RetryingStreamClient<T> {
    transcriber: T,
    config: RetryConfig,
    classifier: Arc<dyn RetryClassifier>,
    cancel: Option<CancellationToken>,
}

impl<T: StreamingTranscriber> RetryingStreamClient<T> {
    /// Client with the default retry budget and classification.
    pub fn new(transcriber: T) -> Self {
        Self::with_config(transcriber, RetryConfig::default())
    }

    /// Client whose classifier is built from `config.non_retriable`.
    pub fn with_config(transcriber: T, config: RetryConfig) -> Self {
        let classifier = Arc::new(config.classifier());
        Self {
            transcriber,
            config,
            classifier,
            cancel: None,
        }
    }

    /// Replace the failure classifier.
    pub fn with_classifier(mut self, classifier: impl RetryClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Stop attempts and pending delays when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn transcriber(&self) -> &T {
        &self.transcriber
    }

    /// Run a transcription of everything `publisher` produces.
    ///
    /// Every attempt reuses the same request and session id and resubscribes
    /// to `publisher`, so audio continues from where the failed attempt
    /// stopped reading. `behavior.on_complete` or `behavior.on_error` is
    /// called exactly once before the future resolves.
    pub async fn start_stream_transcription(
        &self,
        request: &StreamRequest,
        publisher: &AudioStreamPublisher,
        behavior: Arc<dyn StreamTranscriptionBehavior>,
    ) -> STTResult<StreamSummary> {
        let request = request.with_fresh_session();
        let session_id = request.session_id.clone().unwrap_or_default();
        let started = Instant::now();

        info!(
            provider = self.transcriber.provider_name(),
            session_id = %session_id,
            language = %request.language_code,
            max_retries = self.config.max_retries,
            "Starting streaming transcription"
        );

        match self.run_attempts(&request, publisher, &behavior).await {
            Ok(attempts) => {
                info!(
                    session_id = %session_id,
                    attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Streaming transcription completed"
                );
                behavior.on_complete();
                Ok(StreamSummary {
                    session_id,
                    attempts,
                })
            }
            Err(error) => {
                warn!(session_id = %session_id, "Streaming transcription failed: {}", error);
                behavior.on_error(&error);
                Err(error)
            }
        }
    }

    /// Returns the number of attempts on success.
    async fn run_attempts(
        &self,
        request: &StreamRequest,
        publisher: &AudioStreamPublisher,
        behavior: &Arc<dyn StreamTranscriptionBehavior>,
    ) -> STTResult<u32> {
        let mut attempt = 0u32;
        loop {
            let handler: Arc<dyn StreamTranscriptionBehavior> =
                Arc::new(AttemptBehavior::new(behavior.clone(), attempt));

            let attempt_future = self
                .transcriber
                .stream_transcription(request, publisher, handler);
            let result = match &self.cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(STTError::Cancelled),
                    result = attempt_future => result,
                },
                None => attempt_future.await,
            };

            let error = match result {
                Ok(()) => return Ok(attempt + 1),
                Err(error) => error,
            };

            if error == STTError::Cancelled {
                return Err(error);
            }
            if !self.classifier.is_retriable(&error) {
                debug!(attempt, kind = %error.kind(), "Error is not retriable");
                return Err(error);
            }
            if !self.config.has_budget(attempt) {
                warn!(
                    attempts = attempt + 1,
                    "Retry budget exhausted after {} attempts",
                    attempt + 1
                );
                return Err(error);
            }

            let delay = self.config.retry_delay();
            warn!(
                attempt = attempt + 1,
                max_retries = self.config.max_retries,
                "Retriable stream failure: {}; retrying in {}ms",
                error,
                delay.as_millis()
            );
            self.wait(delay).await?;
            attempt += 1;
        }
    }

    async fn wait(&self, delay: Duration) -> STTResult<()> {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(STTError::Cancelled),
                _ = tokio::time::sleep(delay) => Ok(()),
            },
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

impl<T> std::fmt::Debug for RetryingStreamClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingStreamClient")
            .field("config", &self.config)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}
