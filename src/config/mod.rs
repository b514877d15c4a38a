//! Configuration for streaming transcription
//!
//! Configuration comes from .env files, environment variables, and an
//! optional YAML file. Priority: YAML > ENV vars > .env values > defaults.
//! Command-line flags are applied on top by the binary.
//!
//! # Modules
//! - `env`: Environment variable loading
//! - `yaml`: YAML configuration file loading
//!
//! # Example
//! ```rust,no_run
//! use waav_transcribe::config::StreamConfig;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = StreamConfig::from_env()?;
//!
//! // Load from YAML file with environment variables underneath
//! let config = StreamConfig::from_file(Path::new("transcribe.yaml"))?;
//!
//! println!("Transcribing {} in {}", config.request.language_code, config.aws.region);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

mod env;
mod yaml;

pub use yaml::{AwsYaml, RetryYaml, StreamYaml, YamlConfig};

use crate::core::retry::RetryConfig;
use crate::core::stream::{DEFAULT_CHUNK_SIZE, DEFAULT_REQUEST_WINDOW, MAX_CHUNK_SIZE};
use crate::core::stt::StreamRequest;
use crate::core::stt::aws_transcribe::AwsTranscribeConfig;

/// Complete configuration of a streaming transcription run.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// How to reach the service
    pub aws: AwsTranscribeConfig,
    /// What to transcribe
    pub request: StreamRequest,
    /// Bytes per audio chunk
    pub chunk_size: usize,
    /// Chunks read ahead of the network
    pub request_window: usize,
    pub retry: RetryConfig,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            aws: AwsTranscribeConfig::default(),
            request: StreamRequest::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            request_window: DEFAULT_REQUEST_WINDOW,
            retry: RetryConfig::default(),
        }
    }
}

impl StreamConfig {
    /// Load configuration from environment variables
    ///
    /// .env files are loaded into the environment by the binary at startup.
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or validation fails.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Self::default();
        env::apply_env(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file on top of the environment
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables or YAML values have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = YamlConfig::from_file(path)?;

        let mut config = Self::default();
        env::apply_env(&mut config)?;
        yaml_config.apply(&mut config)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.aws.validate()?;
        self.request.validate()?;

        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(format!(
                "chunk_size must be between 1 and {} bytes, got {}",
                MAX_CHUNK_SIZE, self.chunk_size
            ));
        }

        if self.request_window == 0 {
            return Err("request_window must be at least 1".to_string());
        }

        Ok(())
    }
}
