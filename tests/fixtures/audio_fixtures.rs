//! Audio Test Fixtures
//!
//! Generated audio keeps test inputs reproducible without checked-in files.
//!
//! Audio formats:
//! - Sample rate: 16kHz (16000 Hz)
//! - Bit depth: 16-bit signed PCM
//! - Channels: Mono

use std::f32::consts::PI;
use std::io::{self, Read};
use std::path::Path;

/// Standard sample rate for STT (16kHz)
pub const SAMPLE_RATE: u32 = 16000;

/// Duration constants (in samples at 16kHz)
pub const MS_100: usize = 1600;
pub const SECOND: usize = 16000;

/// Bytes in 100ms of 16kHz mono PCM
pub const CHUNK_100MS_BYTES: usize = MS_100 * 2;

/// Generate silence (zeros)
pub fn generate_silence(duration_samples: usize) -> Vec<i16> {
    vec![0i16; duration_samples]
}

/// Generate a sine wave tone
pub fn generate_sine_wave(duration_samples: usize, frequency: f32, amplitude: f32) -> Vec<i16> {
    let max_amplitude = amplitude * i16::MAX as f32;
    let angular_freq = 2.0 * PI * frequency / SAMPLE_RATE as f32;

    (0..duration_samples)
        .map(|i| ((angular_freq * i as f32).sin() * max_amplitude) as i16)
        .collect()
}

/// Generate speech-like pattern with variable amplitude envelope
pub fn generate_speech_pattern(duration_samples: usize) -> Vec<i16> {
    let base_freq = 150.0;
    let mut state: u64 = 54321;
    let mut envelope = 0.0f32;

    (0..duration_samples)
        .map(|i| {
            // New syllable every 50ms
            if i % 800 == 0 {
                state = state.wrapping_mul(1103515245).wrapping_add(12345);
                let target = ((state >> 16) & 0x7FFF) as f32 / 0x7FFF as f32;
                envelope = envelope * 0.7 + target * 0.3;
            }

            let t = i as f32 / SAMPLE_RATE as f32;
            let fundamental = (2.0 * PI * base_freq * t).sin();
            let harmonic2 = (2.0 * PI * base_freq * 2.0 * t).sin() * 0.5;
            let waveform = (fundamental + harmonic2) / 1.5;
            (waveform * envelope * i16::MAX as f32 * 0.6) as i16
        })
        .collect()
}

/// Generate speech-like pattern as raw bytes
pub fn generate_speech_pattern_bytes(duration_samples: usize) -> Vec<u8> {
    samples_to_bytes(&generate_speech_pattern(duration_samples))
}

/// Convert i16 samples to little-endian bytes
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Write samples as a 16kHz mono 16-bit WAV file
pub fn write_wav_file(path: &Path, samples: &[i16]) -> hound::Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

/// Reader that serves `data` and then fails instead of reaching EOF.
///
/// Simulates an audio line that drops mid-stream.
pub struct DroppingLine {
    data: io::Cursor<Vec<u8>>,
}

impl DroppingLine {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: io::Cursor::new(data),
        }
    }
}

impl Read for DroppingLine {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.read(buf)? {
            0 => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "audio line disconnected",
            )),
            n => Ok(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_wave_generation() {
        let sine = generate_sine_wave(SECOND, 440.0, 0.5);
        assert_eq!(sine.len(), SECOND);
        let peak = sine.iter().map(|s| s.saturating_abs()).max().unwrap_or(0);
        assert!(peak > i16::MAX / 4);
    }

    #[test]
    fn test_speech_pattern_is_deterministic() {
        assert_eq!(generate_speech_pattern(1000), generate_speech_pattern(1000));
        assert_eq!(generate_speech_pattern_bytes(MS_100).len(), CHUNK_100MS_BYTES);
    }

    #[test]
    fn test_dropping_line_fails_after_data() {
        let mut line = DroppingLine::new(vec![7u8; 10]);
        let mut buf = [0u8; 8];
        assert_eq!(line.read(&mut buf).unwrap(), 8);
        assert_eq!(line.read(&mut buf).unwrap(), 2);
        assert_eq!(
            line.read(&mut buf).unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
    }
}
