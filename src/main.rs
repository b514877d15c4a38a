use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use waav_transcribe::StreamConfig;
use waav_transcribe::core::retry::{
    RetryingStreamClient, StreamResponse, StreamTranscriptionBehavior,
};
use waav_transcribe::core::stream::{AudioChunkSource, AudioStreamPublisher};
use waav_transcribe::core::stt::aws_transcribe::{AwsRegion, AwsTranscribeStreamer, MediaEncoding};
use waav_transcribe::core::stt::{STTError, TranscriptEvent};

/// Stream audio to Amazon Transcribe with automatic reconnects
#[derive(Parser, Debug)]
#[command(name = "waav-transcribe")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Language code, e.g. en-US
    language: String,

    /// Media encoding: pcm, flac or ogg-opus
    encoding: MediaEncoding,

    /// Sample rate in Hz
    sample_rate: u32,

    /// Audio file, or `-` to read the live line from stdin
    source: String,

    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// AWS region
    #[arg(long)]
    region: Option<AwsRegion>,

    /// Retries after the first attempt
    #[arg(long)]
    max_retries: Option<u32>,

    /// Delay between attempts in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Bytes per audio chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Print transcript events as JSON lines
    #[arg(long)]
    json: bool,
}

/// Prints transcripts to stdout.
struct PrintBehavior {
    json: bool,
}

impl StreamTranscriptionBehavior for PrintBehavior {
    fn on_response(&self, response: &StreamResponse) {
        info!(
            attempt = response.attempt,
            session_id = response.session_id.as_deref().unwrap_or("-"),
            "Transcription stream accepted"
        );
    }

    fn on_stream(&self, event: TranscriptEvent) {
        if self.json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!("Failed to encode transcript event: {}", e),
            }
            return;
        }

        for result in event.results.iter().filter(|r| r.is_final()) {
            if let Some(text) = result.best_transcript()
                && !text.trim().is_empty()
            {
                println!("[{:>8.2}s] {}", result.start_time, text);
            }
        }
    }

    fn on_error(&self, error: &STTError) {
        error!("Transcription failed: {}", error);
    }

    fn on_complete(&self) {
        info!("Transcription complete");
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<StreamConfig> {
    let mut config = match &cli.config {
        Some(path) => StreamConfig::from_file(path),
        None => StreamConfig::from_env(),
    }
    .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

    // CLI overrides everything
    config.request.language_code = cli.language.clone();
    config.request.media_encoding = cli.encoding;
    config.request.sample_rate = cli.sample_rate;
    if let Some(region) = cli.region {
        config.aws.region = region;
    }
    if let Some(max_retries) = cli.max_retries {
        config.retry.max_retries = max_retries;
    }
    if let Some(delay) = cli.retry_delay_ms {
        config.retry.retry_delay_ms = delay;
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = chunk_size;
    }

    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

fn open_source(source: &str, config: &StreamConfig) -> anyhow::Result<AudioChunkSource> {
    if source == "-" {
        info!("Reading audio from stdin");
        return Ok(AudioChunkSource::stdin(config.chunk_size)?);
    }

    let source = AudioChunkSource::open(source, config.chunk_size)
        .with_context(|| format!("Failed to open audio source {source}"))?;
    if let Some(spec) = source.wav_spec()
        && spec.sample_rate != config.request.sample_rate
    {
        warn!(
            "WAV sample rate {} Hz differs from requested {} Hz",
            spec.sample_rate, config.request.sample_rate
        );
    }
    Ok(source)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout carries only transcripts
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let publisher = AudioStreamPublisher::new(open_source(&cli.source, &config)?);
    let streamer = AwsTranscribeStreamer::new(config.aws.clone())?
        .with_request_window(config.request_window);

    let cancel = CancellationToken::new();
    let client = RetryingStreamClient::with_config(streamer, config.retry.clone())
        .with_cancellation(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping transcription");
            cancel.cancel();
        }
    });

    let behavior = Arc::new(PrintBehavior { json: cli.json });
    let summary = client
        .start_stream_transcription(&config.request, &publisher, behavior)
        .await?;

    info!(
        session_id = %summary.session_id,
        attempts = summary.attempts,
        "Done"
    );
    Ok(())
}
