use serde::Deserialize;
use std::path::Path;

use super::StreamConfig;
use super::env::parse_error_kinds;
use crate::core::stt::aws_transcribe::PartialResultsStability;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// aws:
///   region: "eu-west-1"
///   access_key_id: "AKIA..."
///   secret_access_key: "..."
///   endpoint_url: "http://localhost:4566"
///
/// stream:
///   language_code: "en-US"
///   media_encoding: "pcm"
///   sample_rate: 16000
///   chunk_size: 3200
///   request_window: 8
///   enable_partial_results_stabilization: true
///   partial_results_stability: "medium"
///   show_speaker_label: false
///   vocabulary_name: "medical-terms"
///
/// retry:
///   max_retries: 5
///   retry_delay_ms: 250
///   non_retriable: ["bad_request", "conflict"]
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub aws: Option<AwsYaml>,
    pub stream: Option<StreamYaml>,
    pub retry: Option<RetryYaml>,
}

/// AWS connection settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AwsYaml {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub endpoint_url: Option<String>,
}

/// Streaming request settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StreamYaml {
    pub language_code: Option<String>,
    pub media_encoding: Option<String>,
    pub sample_rate: Option<u32>,
    /// Bytes per audio chunk
    pub chunk_size: Option<usize>,
    /// Chunks read ahead of the network
    pub request_window: Option<usize>,
    pub enable_partial_results_stabilization: Option<bool>,
    pub partial_results_stability: Option<String>,
    pub show_speaker_label: Option<bool>,
    pub vocabulary_name: Option<String>,
    pub vocabulary_filter_name: Option<String>,
}

/// Retry settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RetryYaml {
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    /// Error kinds that are never retried, e.g. `bad_request`
    pub non_retriable: Option<Vec<String>>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Fields have invalid types
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }

    /// Overwrite every value of `config` that this file sets.
    pub(crate) fn apply(&self, config: &mut StreamConfig) -> Result<(), String> {
        if let Some(aws) = &self.aws {
            if let Some(region) = &aws.region {
                config.aws.region = region.parse()?;
            }
            if let Some(key_id) = &aws.access_key_id {
                config.aws.aws_access_key_id = Some(key_id.clone());
            }
            if let Some(secret) = &aws.secret_access_key {
                config.aws.aws_secret_access_key = Some(secret.clone());
            }
            if let Some(token) = &aws.session_token {
                config.aws.aws_session_token = Some(token.clone());
            }
            if let Some(endpoint) = &aws.endpoint_url {
                config.aws.endpoint_url = Some(endpoint.clone());
            }
        }

        if let Some(stream) = &self.stream {
            let request = &mut config.request;
            if let Some(language) = &stream.language_code {
                request.language_code = language.clone();
            }
            if let Some(encoding) = &stream.media_encoding {
                request.media_encoding = encoding.parse()?;
            }
            if let Some(rate) = stream.sample_rate {
                request.sample_rate = rate;
            }
            if let Some(enabled) = stream.enable_partial_results_stabilization {
                request.enable_partial_results_stabilization = enabled;
            }
            if let Some(stability) = &stream.partial_results_stability {
                request.partial_results_stability =
                    PartialResultsStability::from_str_or_default(stability);
            }
            if let Some(enabled) = stream.show_speaker_label {
                request.show_speaker_label = enabled;
            }
            if let Some(vocab) = &stream.vocabulary_name {
                request.vocabulary_name = Some(vocab.clone());
            }
            if let Some(filter) = &stream.vocabulary_filter_name {
                request.vocabulary_filter_name = Some(filter.clone());
            }
            if let Some(size) = stream.chunk_size {
                config.chunk_size = size;
            }
            if let Some(window) = stream.request_window {
                config.request_window = window;
            }
        }

        if let Some(retry) = &self.retry {
            if let Some(max) = retry.max_retries {
                config.retry.max_retries = max;
            }
            if let Some(delay) = retry.retry_delay_ms {
                config.retry.retry_delay_ms = delay;
            }
            if let Some(kinds) = &retry.non_retriable {
                config.retry.non_retriable = parse_error_kinds(kinds.iter().map(String::as_str))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stt::ErrorKind;
    use crate::core::stt::aws_transcribe::{AwsRegion, MediaEncoding};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
aws:
  region: "eu-west-1"
  access_key_id: "AKIAEXAMPLE"
  secret_access_key: "secret"
  endpoint_url: "http://localhost:4566"

stream:
  language_code: "fr-FR"
  media_encoding: "flac"
  sample_rate: 32000
  chunk_size: 4096
  request_window: 4
  enable_partial_results_stabilization: true
  partial_results_stability: "low"
  vocabulary_filter_name: "profanity"

retry:
  max_retries: 3
  retry_delay_ms: 250
  non_retriable: ["bad_request", "conflict"]
"#;
        let yaml: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        let mut config = StreamConfig::default();
        yaml.apply(&mut config).unwrap();

        assert_eq!(config.aws.region, AwsRegion::EuWest1);
        assert!(config.aws.has_explicit_credentials());
        assert_eq!(config.aws.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(config.request.language_code, "fr-FR");
        assert_eq!(config.request.media_encoding, MediaEncoding::Flac);
        assert_eq!(config.request.sample_rate, 32000);
        assert_eq!(
            config.request.partial_results_stability,
            PartialResultsStability::Low
        );
        assert_eq!(config.request.vocabulary_filter_name.as_deref(), Some("profanity"));
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.request_window, 4);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.retry_delay_ms, 250);
        assert_eq!(
            config.retry.non_retriable,
            vec![ErrorKind::BadRequest, ErrorKind::Conflict]
        );
    }

    #[test]
    fn test_yaml_config_partial() {
        let yaml: YamlConfig = serde_yaml::from_str("retry:\n  max_retries: 1\n").unwrap();
        let mut config = StreamConfig::default();
        yaml.apply(&mut config).unwrap();

        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.request.language_code, "en-US");
        assert_eq!(config.aws.region, AwsRegion::UsEast1);
    }

    #[test]
    fn test_yaml_config_empty() {
        let yaml: YamlConfig = serde_yaml::from_str("").unwrap_or_default();
        assert!(yaml.aws.is_none());
        assert!(yaml.stream.is_none());
        assert!(yaml.retry.is_none());
    }

    #[test]
    fn test_yaml_config_rejects_unknown_values() {
        let mut config = StreamConfig::default();

        let bad_region: YamlConfig = serde_yaml::from_str("aws:\n  region: nowhere-1\n").unwrap();
        assert!(bad_region.apply(&mut config).is_err());

        let bad_kind: YamlConfig =
            serde_yaml::from_str("retry:\n  non_retriable: [sometimes]\n").unwrap();
        assert!(bad_kind.apply(&mut config).unwrap_err().contains("sometimes"));
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "stream:\n  sample_rate: 8000\n").unwrap();

        let yaml = YamlConfig::from_file(&config_path).unwrap();
        assert_eq!(yaml.stream.unwrap().sample_rate, Some(8000));
    }

    #[test]
    fn test_from_file_not_found() {
        let result = YamlConfig::from_file(Path::new("/nonexistent/config.yaml"));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
