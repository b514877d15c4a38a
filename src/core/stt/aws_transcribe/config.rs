//! Configuration types for Amazon Transcribe Streaming.
//!
//! [`AwsTranscribeConfig`] describes how to reach the service (region,
//! credentials, endpoint). What to transcribe lives in
//! [`StreamRequest`](crate::core::stt::StreamRequest), which uses the enums
//! defined here.
//!
//! # Example
//!
//! ```rust,ignore
//! use waav_transcribe::core::stt::aws_transcribe::{AwsRegion, AwsTranscribeConfig};
//!
//! let config = AwsTranscribeConfig {
//!     region: AwsRegion::EuWest1,
//!     ..Default::default()
//! };
//! ```

use std::str::FromStr;

use aws_sdk_transcribestreaming::types as sdk;
use serde::{Deserialize, Serialize};

// =============================================================================
// AWS Regions
// =============================================================================

/// AWS regions where Amazon Transcribe Streaming is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AwsRegion {
    #[default]
    #[serde(rename = "us-east-1")]
    UsEast1,
    #[serde(rename = "us-east-2")]
    UsEast2,
    #[serde(rename = "us-west-2")]
    UsWest2,
    #[serde(rename = "ap-south-1")]
    ApSouth1,
    #[serde(rename = "ap-southeast-1")]
    ApSoutheast1,
    #[serde(rename = "ap-southeast-2")]
    ApSoutheast2,
    #[serde(rename = "ap-northeast-1")]
    ApNortheast1,
    #[serde(rename = "ap-northeast-2")]
    ApNortheast2,
    #[serde(rename = "ca-central-1")]
    CaCentral1,
    #[serde(rename = "eu-central-1")]
    EuCentral1,
    #[serde(rename = "eu-west-1")]
    EuWest1,
    #[serde(rename = "eu-west-2")]
    EuWest2,
    #[serde(rename = "sa-east-1")]
    SaEast1,
}

impl AwsRegion {
    pub const ALL: [AwsRegion; 13] = [
        Self::UsEast1,
        Self::UsEast2,
        Self::UsWest2,
        Self::ApSouth1,
        Self::ApSoutheast1,
        Self::ApSoutheast2,
        Self::ApNortheast1,
        Self::ApNortheast2,
        Self::CaCentral1,
        Self::EuCentral1,
        Self::EuWest1,
        Self::EuWest2,
        Self::SaEast1,
    ];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsEast1 => "us-east-1",
            Self::UsEast2 => "us-east-2",
            Self::UsWest2 => "us-west-2",
            Self::ApSouth1 => "ap-south-1",
            Self::ApSoutheast1 => "ap-southeast-1",
            Self::ApSoutheast2 => "ap-southeast-2",
            Self::ApNortheast1 => "ap-northeast-1",
            Self::ApNortheast2 => "ap-northeast-2",
            Self::CaCentral1 => "ca-central-1",
            Self::EuCentral1 => "eu-central-1",
            Self::EuWest1 => "eu-west-1",
            Self::EuWest2 => "eu-west-2",
            Self::SaEast1 => "sa-east-1",
        }
    }
}

impl FromStr for AwsRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|region| region.as_str() == wanted)
            .ok_or_else(|| format!("Unsupported AWS region for streaming transcription: {s}"))
    }
}

impl std::fmt::Display for AwsRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Media Encoding
// =============================================================================

/// Audio encodings accepted by the streaming API.
///
/// PCM must be 16-bit signed little-endian mono.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MediaEncoding {
    #[default]
    #[serde(rename = "pcm")]
    Pcm,
    #[serde(rename = "flac")]
    Flac,
    /// Opus in an OGG container
    #[serde(rename = "ogg-opus")]
    OggOpus,
}

impl MediaEncoding {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pcm => "pcm",
            Self::Flac => "flac",
            Self::OggOpus => "ogg-opus",
        }
    }

    pub(crate) fn to_sdk(self) -> sdk::MediaEncoding {
        match self {
            Self::Pcm => sdk::MediaEncoding::Pcm,
            Self::Flac => sdk::MediaEncoding::Flac,
            Self::OggOpus => sdk::MediaEncoding::OggOpus,
        }
    }
}

impl FromStr for MediaEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pcm" | "linear16" | "pcm_s16le" => Ok(Self::Pcm),
            "flac" => Ok(Self::Flac),
            "ogg-opus" | "opus" | "ogg_opus" => Ok(Self::OggOpus),
            other => Err(format!(
                "Unsupported media encoding '{other}', expected pcm, flac or ogg-opus"
            )),
        }
    }
}

impl std::fmt::Display for MediaEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Partial Results Stability
// =============================================================================

/// Trade-off between latency and accuracy of interim results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PartialResultsStability {
    /// Fastest, slight accuracy reduction
    #[default]
    #[serde(rename = "high")]
    High,
    #[serde(rename = "medium")]
    Medium,
    /// Most accurate, higher latency
    #[serde(rename = "low")]
    Low,
}

impl PartialResultsStability {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parse from string, with fallback to High.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "medium" | "med" => Self::Medium,
            "low" => Self::Low,
            _ => Self::default(),
        }
    }

    pub(crate) fn to_sdk(self) -> sdk::PartialResultsStability {
        match self {
            Self::High => sdk::PartialResultsStability::High,
            Self::Medium => sdk::PartialResultsStability::Medium,
            Self::Low => sdk::PartialResultsStability::Low,
        }
    }
}

impl std::fmt::Display for PartialResultsStability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Connection Configuration
// =============================================================================

/// Minimum supported sample rate (Hz)
pub const MIN_SAMPLE_RATE: u32 = 8000;

/// Maximum supported sample rate (Hz)
pub const MAX_SAMPLE_RATE: u32 = 48000;

/// Recommended sample rate for best quality/latency balance (Hz)
pub const RECOMMENDED_SAMPLE_RATE: u32 = 16000;

/// Language used when the requested code is not supported.
pub const FALLBACK_LANGUAGE_CODE: &str = "en-US";

/// How to reach Amazon Transcribe Streaming.
///
/// # Authentication
///
/// Explicit keys take precedence. Without them the default AWS provider
/// chain is used: environment variables, `~/.aws/credentials`, then instance
/// or task roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsTranscribeConfig {
    #[serde(default)]
    pub region: AwsRegion,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_access_key_id: Option<String>,

    #[serde(default, skip_serializing)]
    pub aws_secret_access_key: Option<String>,

    /// Session token for temporary credentials
    #[serde(default, skip_serializing)]
    pub aws_session_token: Option<String>,

    /// Override the service endpoint, e.g. for a local mock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

impl AwsTranscribeConfig {
    pub fn new(region: AwsRegion) -> Self {
        Self {
            region,
            ..Default::default()
        }
    }

    /// Whether both halves of an access key pair are set.
    pub fn has_explicit_credentials(&self) -> bool {
        self.aws_access_key_id.is_some() && self.aws_secret_access_key.is_some()
    }

    /// Validate the connection settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.aws_access_key_id.is_some() != self.aws_secret_access_key.is_some() {
            return Err(
                "aws_access_key_id and aws_secret_access_key must be provided together"
                    .to_string(),
            );
        }

        if let Some(endpoint) = &self.endpoint_url
            && !(endpoint.starts_with("https://") || endpoint.starts_with("http://"))
        {
            return Err(format!("endpoint_url must be an http(s) URL, got {endpoint}"));
        }

        Ok(())
    }
}
