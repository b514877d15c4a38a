//! Streaming transcription request parameters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aws_transcribe::{
    MAX_SAMPLE_RATE, MIN_SAMPLE_RATE, MediaEncoding, PartialResultsStability,
    RECOMMENDED_SAMPLE_RATE,
};

/// Parameters of one streaming session.
///
/// Everything except `session_id` is fixed for the lifetime of a logical
/// transcription. A retry reuses the request as-is; a new top-level call gets
/// a fresh session id through [`with_fresh_session`](Self::with_fresh_session).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRequest {
    /// BCP-47 language code, e.g. `en-US`
    pub language_code: String,

    /// Audio encoding of the published chunks
    #[serde(default)]
    pub media_encoding: MediaEncoding,

    /// Sample rate of the audio in Hz
    pub sample_rate: u32,

    /// Session id sent to the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Only let the last few words of interim results change
    #[serde(default)]
    pub enable_partial_results_stabilization: bool,

    /// Stability level used when stabilization is enabled
    #[serde(default)]
    pub partial_results_stability: PartialResultsStability,

    /// Enable speaker identification
    #[serde(default)]
    pub show_speaker_label: bool,

    /// Custom vocabulary name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary_name: Option<String>,

    /// Custom vocabulary filter name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary_filter_name: Option<String>,
}

impl Default for StreamRequest {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            media_encoding: MediaEncoding::default(),
            sample_rate: RECOMMENDED_SAMPLE_RATE,
            session_id: None,
            enable_partial_results_stabilization: false,
            partial_results_stability: PartialResultsStability::default(),
            show_speaker_label: false,
            vocabulary_name: None,
            vocabulary_filter_name: None,
        }
    }
}

impl StreamRequest {
    pub fn new(language_code: &str, media_encoding: MediaEncoding, sample_rate: u32) -> Self {
        Self {
            language_code: language_code.to_string(),
            media_encoding,
            sample_rate,
            ..Default::default()
        }
    }

    /// Copy of this request with a newly generated session id.
    pub fn with_fresh_session(&self) -> Self {
        Self {
            session_id: Some(Uuid::new_v4().to_string()),
            ..self.clone()
        }
    }

    /// Validate the request parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.language_code.trim().is_empty() {
            return Err("language_code must not be empty".to_string());
        }

        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(format!(
                "Sample rate must be between {} and {} Hz, got {}",
                MIN_SAMPLE_RATE, MAX_SAMPLE_RATE, self.sample_rate
            ));
        }

        Ok(())
    }
}
