//! Base error and result types shared by the streaming transcription stack.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while streaming audio for transcription.
///
/// The enum is `Clone` so that a single failure can be handed to a
/// subscriber, logged, and returned to the caller.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum STTError {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The request is malformed, either caught locally or rejected by the service
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Connection to the provider failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Network-level failure while talking to the provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Provider-side failure (internal errors, service unavailable)
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// The provider throttled the request
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The session id conflicts with an active session
    #[error("Session conflict: {0}")]
    Conflict(String),

    /// Audio does not match the declared format
    #[error("Invalid audio format: {0}")]
    InvalidAudioFormat(String),

    /// Reading from the local audio source failed
    #[error("Audio source error: {0}")]
    AudioSource(String),

    /// A subscriber requested a non-positive number of chunks
    #[error("Demand must be positive, got {0}")]
    InvalidDemand(i64),

    /// The operation was cancelled before it finished
    #[error("Operation cancelled")]
    Cancelled,
}

impl STTError {
    /// Coarse classification used by retry policies.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationError(_) => ErrorKind::Configuration,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::ConnectionFailed(_) => ErrorKind::Connection,
            Self::NetworkError(_) => ErrorKind::Network,
            Self::ProviderError(_) => ErrorKind::Provider,
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidAudioFormat(_) => ErrorKind::InvalidAudio,
            Self::AudioSource(_) => ErrorKind::AudioSource,
            Self::InvalidDemand(_) => ErrorKind::InvalidDemand,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<std::io::Error> for STTError {
    fn from(err: std::io::Error) -> Self {
        Self::AudioSource(err.to_string())
    }
}

/// Tag for each [`STTError`] variant, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    BadRequest,
    Connection,
    Network,
    Provider,
    RateLimited,
    Conflict,
    InvalidAudio,
    AudioSource,
    InvalidDemand,
    Cancelled,
}

impl ErrorKind {
    /// Convert to the configuration string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::BadRequest => "bad_request",
            Self::Connection => "connection",
            Self::Network => "network",
            Self::Provider => "provider",
            Self::RateLimited => "rate_limited",
            Self::Conflict => "conflict",
            Self::InvalidAudio => "invalid_audio",
            Self::AudioSource => "audio_source",
            Self::InvalidDemand => "invalid_demand",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from the configuration string form. Dashes and case are ignored.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "configuration" | "config" => Some(Self::Configuration),
            "bad_request" | "badrequest" => Some(Self::BadRequest),
            "connection" => Some(Self::Connection),
            "network" => Some(Self::Network),
            "provider" => Some(Self::Provider),
            "rate_limited" | "rate_limit" => Some(Self::RateLimited),
            "conflict" => Some(Self::Conflict),
            "invalid_audio" => Some(Self::InvalidAudio),
            "audio_source" => Some(Self::AudioSource),
            "invalid_demand" => Some(Self::InvalidDemand),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result type for streaming transcription operations.
pub type STTResult<T> = Result<T, STTError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            STTError::BadRequest("x".to_string()).kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(STTError::InvalidDemand(0).kind(), ErrorKind::InvalidDemand);
        assert_eq!(STTError::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_error_kind_parse() {
        assert_eq!(ErrorKind::parse("bad-request"), Some(ErrorKind::BadRequest));
        assert_eq!(ErrorKind::parse("Rate_Limited"), Some(ErrorKind::RateLimited));
        assert_eq!(ErrorKind::parse("nonsense"), None);
        for kind in [ErrorKind::Network, ErrorKind::Conflict, ErrorKind::AudioSource] {
            assert_eq!(ErrorKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "line closed");
        let err: STTError = io.into();
        assert_eq!(err.kind(), ErrorKind::AudioSource);
        assert!(err.to_string().contains("line closed"));
    }

    #[test]
    fn test_invalid_demand_display() {
        assert_eq!(
            STTError::InvalidDemand(-3).to_string(),
            "Demand must be positive, got -3"
        );
    }
}
