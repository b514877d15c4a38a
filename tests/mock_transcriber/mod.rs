//! Scripted Streaming Transcriber
//!
//! Consumes the audio publisher like a real backend and follows a per-attempt
//! plan, so retry behavior can be exercised end to end without a network:
//! - Complete: transcribe every chunk until the audio ends
//! - DropAfter: fail with an error after a number of chunks
//! - Reject: fail before reading any audio

// Not every test binary uses every helper
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;

use waav_transcribe::core::retry::{
    StreamResponse, StreamTranscriptionBehavior, StreamingTranscriber,
};
use waav_transcribe::core::stream::{AudioEventStream, AudioStreamPublisher};
use waav_transcribe::core::stt::aws_transcribe::{Alternative, TranscriptResult};
use waav_transcribe::core::stt::{STTError, STTResult, StreamRequest, TranscriptEvent};

/// What one attempt does.
#[derive(Debug, Clone)]
pub enum AttemptPlan {
    Complete,
    DropAfter { chunks: usize, error: STTError },
    Reject(STTError),
}

/// Chunks received by one attempt.
#[derive(Debug, Clone, Default)]
pub struct AttemptLog {
    pub session_id: Option<String>,
    pub chunks: Vec<Vec<u8>>,
}

pub struct MockTranscriber {
    plan: Mutex<VecDeque<AttemptPlan>>,
    attempts: AtomicU32,
    log: Mutex<Vec<AttemptLog>>,
    window: usize,
}

impl MockTranscriber {
    /// Attempts past the end of `plan` complete.
    pub fn new(plan: Vec<AttemptPlan>, window: usize) -> Self {
        Self {
            plan: Mutex::new(plan.into()),
            attempts: AtomicU32::new(0),
            log: Mutex::new(Vec::new()),
            window,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> Vec<AttemptLog> {
        self.log.lock().clone()
    }

    /// Every chunk received, across all attempts, in arrival order.
    pub fn all_chunks(&self) -> Vec<Vec<u8>> {
        self.log
            .lock()
            .iter()
            .flat_map(|attempt| attempt.chunks.clone())
            .collect()
    }

    fn record(&self, attempt: usize, chunk: Vec<u8>) {
        self.log.lock()[attempt].chunks.push(chunk);
    }
}

fn transcript(sequence: u64) -> TranscriptEvent {
    TranscriptEvent {
        results: vec![TranscriptResult {
            result_id: Some(format!("chunk-{sequence}")),
            is_partial: false,
            alternatives: vec![Alternative {
                transcript: format!("chunk {sequence}"),
                items: vec![],
            }],
            ..Default::default()
        }],
    }
}

#[async_trait]
impl StreamingTranscriber for MockTranscriber {
    async fn stream_transcription(
        &self,
        request: &StreamRequest,
        publisher: &AudioStreamPublisher,
        behavior: Arc<dyn StreamTranscriptionBehavior>,
    ) -> STTResult<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) as usize;
        self.log.lock().push(AttemptLog {
            session_id: request.session_id.clone(),
            chunks: Vec::new(),
        });
        let plan = self.plan.lock().pop_front().unwrap_or(AttemptPlan::Complete);

        if let AttemptPlan::Reject(error) = plan {
            return Err(error);
        }

        let mut events = AudioEventStream::subscribe(publisher, self.window)?;
        behavior.on_response(&StreamResponse {
            session_id: request.session_id.clone(),
            attempt: 0,
        });

        let mut received = 0usize;
        while let Some(item) = events.next().await {
            let event = item?;
            self.record(attempt, event.chunk().to_vec());
            behavior.on_stream(transcript(event.sequence()));
            received += 1;

            if let AttemptPlan::DropAfter { chunks, error } = &plan
                && received >= *chunks
            {
                return Err(error.clone());
            }
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Behavior that keeps everything it is told.
#[derive(Default)]
pub struct CollectingBehavior {
    pub responses: Mutex<Vec<StreamResponse>>,
    pub transcripts: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<STTError>>,
    pub completions: AtomicU32,
}

impl CollectingBehavior {
    pub fn completions(&self) -> u32 {
        self.completions.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> Vec<STTError> {
        self.errors.lock().clone()
    }
}

impl StreamTranscriptionBehavior for CollectingBehavior {
    fn on_response(&self, response: &StreamResponse) {
        self.responses.lock().push(response.clone());
    }

    fn on_stream(&self, event: TranscriptEvent) {
        let mut transcripts = self.transcripts.lock();
        transcripts.extend(event.final_transcripts().into_iter().map(str::to_string));
    }

    fn on_error(&self, error: &STTError) {
        self.errors.lock().push(error.clone());
    }

    fn on_complete(&self) {
        self.completions.fetch_add(1, Ordering::SeqCst);
    }
}
