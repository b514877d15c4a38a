//! Blocking audio byte sources cut into fixed-size chunks.

use std::fs::File;
use std::io::{BufReader, ErrorKind as IoErrorKind, Read};
use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use crate::core::stt::{STTError, STTResult};

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Upper bound for a single chunk. Matches what the service accepts per audio event.
pub const MAX_CHUNK_SIZE: usize = 256 * 1024;

/// Pull-based supplier of audio chunks read from a blocking byte source.
///
/// Each call to [`next_chunk`](Self::next_chunk) fills one chunk completely
/// unless the source runs dry, in which case the final chunk is shorter.
/// Once the source is exhausted every further call returns `Ok(None)`.
pub struct AudioChunkSource {
    reader: Box<dyn Read + Send>,
    chunk_size: usize,
    exhausted: bool,
    wav_spec: Option<hound::WavSpec>,
    bytes_read: u64,
}

impl AudioChunkSource {
    /// Wrap an arbitrary reader.
    pub fn from_reader<R>(reader: R, chunk_size: usize) -> STTResult<Self>
    where
        R: Read + Send + 'static,
    {
        validate_chunk_size(chunk_size)?;
        Ok(Self {
            reader: Box::new(reader),
            chunk_size,
            exhausted: false,
            wav_spec: None,
            bytes_read: 0,
        })
    }

    /// Open an audio file.
    ///
    /// Files with a `.wav` extension are parsed so that only the sample data
    /// is streamed; anything else is streamed as raw bytes.
    pub fn open(path: impl AsRef<Path>, chunk_size: usize) -> STTResult<Self> {
        validate_chunk_size(chunk_size)?;
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            STTError::AudioSource(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let is_wav = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));

        if is_wav {
            let wav = hound::WavReader::new(BufReader::new(file)).map_err(|e| {
                STTError::InvalidAudioFormat(format!(
                    "Failed to parse WAV header of {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let spec = wav.spec();
            debug!(
                sample_rate = spec.sample_rate,
                channels = spec.channels,
                bits_per_sample = spec.bits_per_sample,
                "Opened WAV audio source {}",
                path.display()
            );
            let mut source = Self::from_reader(wav.into_inner(), chunk_size)?;
            source.wav_spec = Some(spec);
            Ok(source)
        } else {
            debug!("Opened raw audio source {}", path.display());
            Self::from_reader(BufReader::new(file), chunk_size)
        }
    }

    /// Read from standard input, e.g. `arecord -f S16_LE -r 16000 | waav-transcribe ...`.
    pub fn stdin(chunk_size: usize) -> STTResult<Self> {
        Self::from_reader(std::io::stdin(), chunk_size)
    }

    /// Configured chunk size in bytes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// WAV header of the source, if it was opened as a WAV file.
    pub fn wav_spec(&self) -> Option<hound::WavSpec> {
        self.wav_spec
    }

    /// Whether the end of the source has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Total bytes handed out so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Read the next chunk.
    ///
    /// Returns `Ok(None)` once the source is exhausted. An I/O error leaves the
    /// source exhausted as well so that it cannot be resumed mid-chunk.
    pub fn next_chunk(&mut self) -> STTResult<Option<Bytes>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < self.chunk_size {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.exhausted = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
                Err(e) => {
                    self.exhausted = true;
                    return Err(e.into());
                }
            }
        }

        if filled == 0 {
            return Ok(None);
        }

        buf.truncate(filled);
        self.bytes_read += filled as u64;
        Ok(Some(Bytes::from(buf)))
    }
}

impl std::fmt::Debug for AudioChunkSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioChunkSource")
            .field("chunk_size", &self.chunk_size)
            .field("exhausted", &self.exhausted)
            .field("wav_spec", &self.wav_spec)
            .field("bytes_read", &self.bytes_read)
            .finish()
    }
}

fn validate_chunk_size(chunk_size: usize) -> STTResult<()> {
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
        return Err(STTError::ConfigurationError(format!(
            "Chunk size must be between 1 and {} bytes, got {}",
            MAX_CHUNK_SIZE, chunk_size
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that hands out at most `step` bytes per call.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("device unplugged"))
        }
    }

    #[test]
    fn test_chunks_in_order_with_short_tail() {
        let data: Vec<u8> = (0..2500u32).map(|i| (i % 251) as u8).collect();
        let mut source = AudioChunkSource::from_reader(Cursor::new(data.clone()), 1024).unwrap();

        let first = source.next_chunk().unwrap().unwrap();
        let second = source.next_chunk().unwrap().unwrap();
        let third = source.next_chunk().unwrap().unwrap();
        assert_eq!(first.len(), 1024);
        assert_eq!(second.len(), 1024);
        assert_eq!(third.len(), 452);
        assert!(source.next_chunk().unwrap().is_none());
        assert!(source.is_exhausted());

        let joined: Vec<u8> = [first, second, third].concat();
        assert_eq!(joined, data);
        assert_eq!(source.bytes_read(), 2500);
    }

    #[test]
    fn test_partial_reads_fill_whole_chunk() {
        let reader = Trickle {
            data: vec![7u8; 2048],
            pos: 0,
            step: 100,
        };
        let mut source = AudioChunkSource::from_reader(reader, 1024).unwrap();
        assert_eq!(source.next_chunk().unwrap().unwrap().len(), 1024);
        assert_eq!(source.next_chunk().unwrap().unwrap().len(), 1024);
        assert!(source.next_chunk().unwrap().is_none());
    }

    #[test]
    fn test_empty_source() {
        let mut source = AudioChunkSource::from_reader(Cursor::new(Vec::new()), 1024).unwrap();
        assert!(source.next_chunk().unwrap().is_none());
        assert!(source.next_chunk().unwrap().is_none());
    }

    #[test]
    fn test_io_error_surfaces_and_exhausts() {
        let mut source = AudioChunkSource::from_reader(Broken, 64).unwrap();
        let err = source.next_chunk().unwrap_err();
        assert!(matches!(err, STTError::AudioSource(ref msg) if msg.contains("unplugged")));
        assert!(source.next_chunk().unwrap().is_none());
    }

    #[test]
    fn test_invalid_chunk_size() {
        assert!(AudioChunkSource::from_reader(Cursor::new(vec![0u8]), 0).is_err());
        assert!(AudioChunkSource::from_reader(Cursor::new(vec![0u8]), MAX_CHUNK_SIZE + 1).is_err());
    }

    #[test]
    fn test_open_wav_skips_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..800i16 {
            writer.write_sample(i).unwrap();
        }
        writer.finalize().unwrap();

        let mut source = AudioChunkSource::open(&path, 1024).unwrap();
        assert_eq!(source.wav_spec().map(|s| s.sample_rate), Some(16000));

        let first = source.next_chunk().unwrap().unwrap();
        // First sample is 0, second is 1 (little-endian i16)
        assert_eq!(&first[..4], &[0, 0, 1, 0]);
        let second = source.next_chunk().unwrap().unwrap();
        assert_eq!(first.len() + second.len(), 1600);
        assert!(source.next_chunk().unwrap().is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let err = AudioChunkSource::open("/nonexistent/audio.raw", 1024).unwrap_err();
        assert!(matches!(err, STTError::AudioSource(ref msg) if msg.contains("Failed to open")));
    }
}
