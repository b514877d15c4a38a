//! Retry budget and failure classification.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::stt::{ErrorKind, STTError};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Default fixed delay between attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 100;

/// Retry budget for a streaming transcription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt. Total attempts are `max_retries + 1`.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Error kinds that are surfaced immediately without retrying.
    #[serde(default = "default_non_retriable")]
    pub non_retriable: Vec<ErrorKind>,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

fn default_non_retriable() -> Vec<ErrorKind> {
    vec![ErrorKind::BadRequest]
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            non_retriable: default_non_retriable(),
        }
    }
}

impl RetryConfig {
    /// Budget with the default classification.
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay_ms: retry_delay.as_millis() as u64,
            ..Default::default()
        }
    }

    #[inline]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Whether the budget allows another attempt after `attempt` (0-based) failed.
    #[inline]
    pub fn has_budget(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Classifier built from `non_retriable`.
    pub fn classifier(&self) -> NonRetriableKinds {
        NonRetriableKinds::new(self.non_retriable.iter().copied())
    }
}

/// Decides whether a failed attempt may be retried.
pub trait RetryClassifier: Send + Sync {
    fn is_retriable(&self, error: &STTError) -> bool;
}

impl<F> RetryClassifier for F
where
    F: Fn(&STTError) -> bool + Send + Sync,
{
    fn is_retriable(&self, error: &STTError) -> bool {
        self(error)
    }
}

/// Treats every error as retriable except the listed kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonRetriableKinds {
    kinds: HashSet<ErrorKind>,
}

impl NonRetriableKinds {
    pub fn new(kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    /// Every error is retriable.
    pub fn none() -> Self {
        Self {
            kinds: HashSet::new(),
        }
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.kinds.contains(&kind)
    }
}

impl Default for NonRetriableKinds {
    fn default() -> Self {
        Self::new(default_non_retriable())
    }
}

impl RetryClassifier for NonRetriableKinds {
    fn is_retriable(&self, error: &STTError) -> bool {
        !self.kinds.contains(&error.kind())
    }
}
