//! Amazon Transcribe Streaming backend.
//!
//! [`AwsTranscribeStreamer`] runs one streaming attempt per call: it
//! subscribes to the audio publisher, forwards chunks as SDK audio events and
//! turns the transcript result stream into [`TranscriptEvent`]s.
//!
//! # Audio Format Requirements
//!
//! - PCM: 16-bit signed little-endian, mono
//! - Sample rate: 8,000 Hz to 48,000 Hz (16,000 Hz recommended)
//! - Chunk duration: 50-200 ms for optimal latency

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_transcribestreaming::Client as TranscribeClient;
use aws_sdk_transcribestreaming::error::ProvideErrorMetadata;
use aws_sdk_transcribestreaming::types::{self as sdk, AudioStream, LanguageCode, TranscriptResultStream};
use aws_smithy_types::Blob;
use aws_smithy_types::error::display::DisplayErrorContext;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::config::{AwsTranscribeConfig, FALLBACK_LANGUAGE_CODE};
use super::messages::TranscriptEvent;
use crate::core::retry::{StreamResponse, StreamTranscriptionBehavior, StreamingTranscriber};
use crate::core::stream::{AudioEventStream, AudioStreamPublisher, DEFAULT_REQUEST_WINDOW};
use crate::core::stt::{STTError, STTResult, StreamRequest};

/// Credentials provider name reported to the SDK.
const PROVIDER_NAME: &str = "waav-transcribe";

/// Streaming transcription against Amazon Transcribe.
pub struct AwsTranscribeStreamer {
    config: AwsTranscribeConfig,
    client: OnceCell<TranscribeClient>,
    request_window: usize,
}

impl AwsTranscribeStreamer {
    pub fn new(config: AwsTranscribeConfig) -> STTResult<Self> {
        config.validate().map_err(STTError::ConfigurationError)?;
        Ok(Self {
            config,
            client: OnceCell::new(),
            request_window: DEFAULT_REQUEST_WINDOW,
        })
    }

    /// Number of audio chunks read ahead of the network.
    pub fn with_request_window(mut self, window: usize) -> Self {
        self.request_window = window.max(1);
        self
    }

    pub fn config(&self) -> &AwsTranscribeConfig {
        &self.config
    }

    /// SDK client, built on first use.
    async fn client(&self) -> &TranscribeClient {
        self.client
            .get_or_init(|| async {
                let region = aws_config::Region::new(self.config.region.as_str());
                let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);

                if let (Some(key_id), Some(secret)) = (
                    self.config.aws_access_key_id.as_deref(),
                    self.config.aws_secret_access_key.as_deref(),
                ) {
                    let credentials = aws_credential_types::Credentials::new(
                        key_id,
                        secret,
                        self.config.aws_session_token.clone(),
                        None,
                        PROVIDER_NAME,
                    );
                    loader = loader.credentials_provider(credentials);
                } else {
                    debug!("Using default AWS credential chain");
                }

                let sdk_config = loader.load().await;
                let mut builder = aws_sdk_transcribestreaming::config::Builder::from(&sdk_config);
                if let Some(endpoint) = &self.config.endpoint_url {
                    builder = builder.endpoint_url(endpoint);
                }
                TranscribeClient::from_conf(builder.build())
            })
            .await
    }
}

#[async_trait]
impl StreamingTranscriber for AwsTranscribeStreamer {
    async fn stream_transcription(
        &self,
        request: &StreamRequest,
        publisher: &AudioStreamPublisher,
        behavior: Arc<dyn StreamTranscriptionBehavior>,
    ) -> STTResult<()> {
        // A malformed request can never succeed, so it must not be retried
        request.validate().map_err(STTError::BadRequest)?;
        let client = self.client().await;

        let mut call = client
            .start_stream_transcription()
            .language_code(resolve_language_code(&request.language_code))
            .media_sample_rate_hertz(request.sample_rate as i32)
            .media_encoding(request.media_encoding.to_sdk());

        if request.enable_partial_results_stabilization {
            call = call
                .enable_partial_results_stabilization(true)
                .partial_results_stability(request.partial_results_stability.to_sdk());
        }
        if request.show_speaker_label {
            call = call.show_speaker_label(true);
        }
        if let Some(vocab) = &request.vocabulary_name {
            call = call.vocabulary_name(vocab);
        }
        if let Some(filter) = &request.vocabulary_filter_name {
            call = call.vocabulary_filter_name(filter);
        }
        if let Some(session_id) = &request.session_id {
            call = call.session_id(session_id);
        }

        let events = AudioEventStream::subscribe(publisher, self.request_window)?;
        let source_error = Arc::new(Mutex::new(None::<STTError>));
        let slot = source_error.clone();

        let audio_stream = async_stream::stream! {
            let mut events = events;
            while let Some(item) = events.next().await {
                match item {
                    Ok(event) => {
                        // Blob needs an owned Vec
                        let audio_event = sdk::AudioEvent::builder()
                            .audio_chunk(Blob::new(event.into_chunk().to_vec()))
                            .build();
                        yield Ok(AudioStream::AudioEvent(audio_event));
                    }
                    Err(error) => {
                        warn!("Audio source failed, ending input stream: {}", error);
                        *slot.lock() = Some(error);
                        break;
                    }
                }
            }
            debug!("Audio input stream finished");
        };

        let output = call
            .audio_stream(audio_stream.into())
            .send()
            .await
            .map_err(|e| map_sdk_error(&e, STTError::ConnectionFailed))?;

        let session_id = output.session_id().map(str::to_string);
        info!(
            session_id = session_id.as_deref().unwrap_or("-"),
            "Amazon Transcribe stream started"
        );
        behavior.on_response(&StreamResponse {
            session_id,
            attempt: 0,
        });

        let mut results = output.transcript_result_stream;
        loop {
            match results.recv().await {
                Ok(Some(TranscriptResultStream::TranscriptEvent(event))) => {
                    behavior.on_stream(TranscriptEvent::from(event));
                }
                Ok(Some(other)) => {
                    debug!("Ignoring unknown transcript stream event: {:?}", other);
                }
                Ok(None) => break,
                Err(e) => {
                    if let Some(error) = source_error.lock().take() {
                        return Err(error);
                    }
                    return Err(map_sdk_error(&e, STTError::NetworkError));
                }
            }
        }

        if let Some(error) = source_error.lock().take() {
            return Err(error);
        }
        info!("Amazon Transcribe stream ended");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "aws-transcribe"
    }
}

impl std::fmt::Debug for AwsTranscribeStreamer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsTranscribeStreamer")
            .field("region", &self.config.region)
            .field("explicit_credentials", &self.config.has_explicit_credentials())
            .field("request_window", &self.request_window)
            .finish()
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Map a supported language code to the SDK enum, falling back to en-US.
pub(crate) fn resolve_language_code(language: &str) -> LanguageCode {
    let wanted = language.trim().replace('_', "-");
    match LanguageCode::values()
        .iter()
        .find(|code| code.eq_ignore_ascii_case(&wanted))
    {
        Some(code) => LanguageCode::from(*code),
        None => {
            warn!(
                "Unsupported language code '{}', defaulting to {}",
                language, FALLBACK_LANGUAGE_CODE
            );
            LanguageCode::from(FALLBACK_LANGUAGE_CODE)
        }
    }
}

/// Map a service error code to an error kind.
///
/// `fallback` builds the error when no code is available, which means the
/// request never got a service response.
pub(crate) fn classify_error_code(
    code: Option<&str>,
    message: String,
    fallback: fn(String) -> STTError,
) -> STTError {
    match code {
        Some("BadRequestException") => STTError::BadRequest(message),
        Some("LimitExceededException") => STTError::RateLimited(message),
        Some("ConflictException") => STTError::Conflict(message),
        Some(_) => STTError::ProviderError(message),
        None => fallback(message),
    }
}

fn map_sdk_error<E>(error: &E, fallback: fn(String) -> STTError) -> STTError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let message = format!("Amazon Transcribe: {}", DisplayErrorContext(error));
    classify_error_code(error.code(), message, fallback)
}
