//! Transcript events delivered to the caller.
//!
//! These mirror the Amazon Transcribe Streaming `TranscriptEvent` shape,
//! converted from the SDK types so that behaviors and tests never depend on
//! the SDK directly.

use aws_sdk_transcribestreaming::types as sdk;
use serde::{Deserialize, Serialize};

// =============================================================================
// Transcription Results
// =============================================================================

/// A single word or punctuation mark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptItem {
    /// The transcribed word or punctuation.
    pub content: String,

    /// `pronunciation` or `punctuation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    /// Start time in seconds from the beginning of the stream.
    pub start_time: f64,

    /// End time in seconds from the beginning of the stream.
    pub end_time: f64,

    /// Confidence score (0.0 to 1.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Speaker label when speaker identification is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,

    /// Whether this item will not change in later partial results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable: Option<bool>,
}

/// One candidate transcription of a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub transcript: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<TranscriptItem>,
}

/// A transcription segment, partial or final.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_id: Option<String>,

    pub start_time: f64,

    pub end_time: f64,

    /// `true` while the segment may still change.
    pub is_partial: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,

    /// Detected or configured language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,

    /// Alternatives, best first.
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

/// One event of the transcript result stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    #[serde(default)]
    pub results: Vec<TranscriptResult>,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl TranscriptResult {
    /// Transcript of the first alternative.
    pub fn best_transcript(&self) -> Option<&str> {
        self.alternatives.first().map(|alt| alt.transcript.as_str())
    }

    pub fn is_final(&self) -> bool {
        !self.is_partial
    }

    /// Average word confidence of the best alternative, 0.0 if unknown.
    pub fn confidence(&self) -> f32 {
        let Some(alt) = self.alternatives.first() else {
            return 0.0;
        };
        let confidences: Vec<f64> = alt.items.iter().filter_map(|item| item.confidence).collect();
        if confidences.is_empty() {
            return 0.0;
        }
        (confidences.iter().sum::<f64>() / confidences.len() as f64) as f32
    }

    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    /// Words of the best alternative that will not change any more.
    pub fn stable_words(&self) -> Vec<&str> {
        self.alternatives
            .first()
            .map(|alt| {
                alt.items
                    .iter()
                    .filter(|item| item.stable.unwrap_or(false))
                    .map(|item| item.content.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl TranscriptEvent {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn has_final_results(&self) -> bool {
        self.results.iter().any(TranscriptResult::is_final)
    }

    /// Best transcript of the first result.
    pub fn best_transcript(&self) -> Option<&str> {
        self.results.first().and_then(TranscriptResult::best_transcript)
    }

    /// Best transcripts of all final, non-blank results.
    pub fn final_transcripts(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.is_final())
            .filter_map(TranscriptResult::best_transcript)
            .filter(|text| !text.trim().is_empty())
            .collect()
    }
}

// =============================================================================
// SDK Conversions
// =============================================================================

impl From<sdk::Item> for TranscriptItem {
    fn from(item: sdk::Item) -> Self {
        Self {
            content: item.content.unwrap_or_default(),
            item_type: item.r#type.map(|t| t.as_str().to_string()),
            start_time: item.start_time,
            end_time: item.end_time,
            confidence: item.confidence,
            speaker: item.speaker,
            stable: item.stable,
        }
    }
}

impl From<sdk::Alternative> for Alternative {
    fn from(alt: sdk::Alternative) -> Self {
        Self {
            transcript: alt.transcript.unwrap_or_default(),
            items: alt
                .items
                .unwrap_or_default()
                .into_iter()
                .map(TranscriptItem::from)
                .collect(),
        }
    }
}

impl From<sdk::Result> for TranscriptResult {
    fn from(result: sdk::Result) -> Self {
        Self {
            result_id: result.result_id,
            start_time: result.start_time,
            end_time: result.end_time,
            is_partial: result.is_partial,
            channel_id: result.channel_id,
            language_code: result.language_code.map(|l| l.as_str().to_string()),
            alternatives: result
                .alternatives
                .unwrap_or_default()
                .into_iter()
                .map(Alternative::from)
                .collect(),
        }
    }
}

impl From<sdk::TranscriptEvent> for TranscriptEvent {
    fn from(event: sdk::TranscriptEvent) -> Self {
        let results = event
            .transcript
            .and_then(|t| t.results)
            .unwrap_or_default()
            .into_iter()
            .map(TranscriptResult::from)
            .collect();
        Self { results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(content: &str, confidence: Option<f64>, stable: Option<bool>) -> TranscriptItem {
        TranscriptItem {
            content: content.to_string(),
            item_type: Some("pronunciation".to_string()),
            confidence,
            stable,
            ..Default::default()
        }
    }

    fn result(text: &str, is_partial: bool, items: Vec<TranscriptItem>) -> TranscriptResult {
        TranscriptResult {
            result_id: Some("r-1".to_string()),
            start_time: 1.5,
            end_time: 3.5,
            is_partial,
            alternatives: vec![Alternative {
                transcript: text.to_string(),
                items,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_result_best_transcript_and_finality() {
        let r = result("Hello world", false, vec![]);
        assert_eq!(r.best_transcript(), Some("Hello world"));
        assert!(r.is_final());
        assert_eq!(r.duration(), 2.0);

        let partial = result("Hel", true, vec![]);
        assert!(!partial.is_final());
        assert_eq!(TranscriptResult::default().best_transcript(), None);
    }

    #[test]
    fn test_result_confidence() {
        let r = result(
            "Hello world",
            false,
            vec![word("Hello", Some(0.95), None), word("world", Some(0.85), None)],
        );
        assert!((r.confidence() - 0.9).abs() < 0.01);
        assert_eq!(result("x", false, vec![word("x", None, None)]).confidence(), 0.0);
    }

    #[test]
    fn test_stable_words() {
        let r = result(
            "Hello world test",
            true,
            vec![
                word("Hello", None, Some(true)),
                word("world", None, Some(true)),
                word("test", None, Some(false)),
            ],
        );
        assert_eq!(r.stable_words(), vec!["Hello", "world"]);
    }

    #[test]
    fn test_event_final_transcripts() {
        let event = TranscriptEvent {
            results: vec![
                result("partial", true, vec![]),
                result("done", false, vec![]),
                result("  ", false, vec![]),
            ],
        };
        assert!(event.has_final_results());
        assert_eq!(event.best_transcript(), Some("partial"));
        assert_eq!(event.final_transcripts(), vec!["done"]);
        assert!(TranscriptEvent::default().is_empty());
    }

    #[test]
    fn test_event_json_shape() {
        let event = TranscriptEvent {
            results: vec![result("hi", false, vec![word("hi", Some(0.5), None)])],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["results"][0]["alternatives"][0]["transcript"], "hi");
        assert_eq!(json["results"][0]["is_partial"], false);
        assert!(json["results"][0]["alternatives"][0]["items"][0].get("speaker").is_none());

        let back: TranscriptEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_from_sdk_event() {
        let sdk_event = sdk::TranscriptEvent::builder()
            .transcript(
                sdk::Transcript::builder()
                    .results(
                        sdk::Result::builder()
                            .result_id("abc")
                            .start_time(0.0)
                            .end_time(1.25)
                            .is_partial(false)
                            .alternatives(
                                sdk::Alternative::builder()
                                    .transcript("hello")
                                    .items(
                                        sdk::Item::builder()
                                            .content("hello")
                                            .start_time(0.0)
                                            .end_time(1.25)
                                            .confidence(0.75)
                                            .build(),
                                    )
                                    .build(),
                            )
                            .build(),
                    )
                    .build(),
            )
            .build();

        let event = TranscriptEvent::from(sdk_event);
        assert_eq!(event.results.len(), 1);
        let r = &event.results[0];
        assert_eq!(r.result_id.as_deref(), Some("abc"));
        assert!(r.is_final());
        assert_eq!(r.best_transcript(), Some("hello"));
        assert_eq!(r.alternatives[0].items[0].confidence, Some(0.75));
        assert_eq!(r.end_time, 1.25);
    }
}
