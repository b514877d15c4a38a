//! Environment variable loading.

use std::env;
use std::str::FromStr;

use super::StreamConfig;
use crate::core::stt::ErrorKind;

/// Read a variable, treating unset and blank the same.
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Parse a variable with `FromStr`, naming the variable in the error.
fn parse_var<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| format!("Invalid value for {name}: {e}"))
        })
        .transpose()
}

/// Parse a list of error kind names.
pub(crate) fn parse_error_kinds<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<ErrorKind>, String> {
    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| ErrorKind::parse(name).ok_or_else(|| format!("Unknown error kind: {name}")))
        .collect()
}

/// Overwrite every value of `config` that the environment sets.
pub(crate) fn apply_env(config: &mut StreamConfig) -> Result<(), String> {
    if let Some(region) = parse_var("AWS_REGION")? {
        config.aws.region = region;
    }
    if let Some(key_id) = var("AWS_ACCESS_KEY_ID") {
        config.aws.aws_access_key_id = Some(key_id);
    }
    if let Some(secret) = var("AWS_SECRET_ACCESS_KEY") {
        config.aws.aws_secret_access_key = Some(secret);
    }
    if let Some(token) = var("AWS_SESSION_TOKEN") {
        config.aws.aws_session_token = Some(token);
    }
    if let Some(endpoint) = var("TRANSCRIBE_ENDPOINT_URL") {
        config.aws.endpoint_url = Some(endpoint);
    }

    if let Some(language) = var("TRANSCRIBE_LANGUAGE_CODE") {
        config.request.language_code = language;
    }
    if let Some(encoding) = parse_var("TRANSCRIBE_MEDIA_ENCODING")? {
        config.request.media_encoding = encoding;
    }
    if let Some(rate) = parse_var("TRANSCRIBE_SAMPLE_RATE")? {
        config.request.sample_rate = rate;
    }
    if let Some(size) = parse_var("TRANSCRIBE_CHUNK_SIZE")? {
        config.chunk_size = size;
    }
    if let Some(window) = parse_var("TRANSCRIBE_REQUEST_WINDOW")? {
        config.request_window = window;
    }

    if let Some(max) = parse_var("TRANSCRIBE_MAX_RETRIES")? {
        config.retry.max_retries = max;
    }
    if let Some(delay) = parse_var("TRANSCRIBE_RETRY_DELAY_MS")? {
        config.retry.retry_delay_ms = delay;
    }
    if let Some(kinds) = var("TRANSCRIBE_NON_RETRIABLE") {
        config.retry.non_retriable = parse_error_kinds(kinds.split(','))?;
    }

    Ok(())
}
