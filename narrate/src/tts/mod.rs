//! Speech synthesis: backend trait, WAV writing, and per-chunk generation.

pub mod gemini;

use crate::audio::AudioArtifact;
use crate::cache::ChunkCache;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Raw PCM audio as returned by a speech service (s16le samples).
#[derive(Debug, Clone)]
pub struct PcmAudio {
    /// Interleaved little-endian 16-bit samples
    pub data: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmAudio {
    /// Mono 24 kHz audio, the fixed format of the speech service.
    pub fn mono_24khz(data: Vec<u8>) -> Self {
        Self {
            data,
            sample_rate: 24_000,
            channels: 1,
        }
    }

    /// Playback duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        let bytes_per_second = self.sample_rate as u64 * self.channels as u64 * 2;
        if bytes_per_second == 0 {
            return 0;
        }
        self.data.len() as u64 * 1000 / bytes_per_second
    }
}

/// A speech synthesis service: text in, raw PCM out.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<PcmAudio>;
}

/// Wrap raw PCM in a WAV container at the given path.
///
/// An odd byte count cannot be a whole number of 16-bit samples and means
/// the service returned a truncated payload; that is an error rather than
/// a silently shortened artifact.
pub fn write_wav(path: &Path, audio: &PcmAudio) -> Result<()> {
    if audio.data.len() % 2 != 0 {
        anyhow::bail!(
            "Truncated PCM payload: {} bytes is not a whole number of 16-bit samples",
            audio.data.len()
        );
    }

    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for sample in audio.data.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([sample[0], sample[1]]))?;
    }

    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}

/// Generates one audio artifact per chunk, writing into the cache.
pub struct SpeechGenerator {
    backend: Arc<dyn SpeechBackend>,
    cache: ChunkCache,
}

impl SpeechGenerator {
    pub fn new(backend: Arc<dyn SpeechBackend>, cache: ChunkCache) -> Self {
        Self { backend, cache }
    }

    /// Synthesize one chunk and write its artifact to the cache path.
    ///
    /// Atomic from the caller's point of view: on any failure a partially
    /// written file is removed before the error is returned. A single
    /// attempt is made; re-running the pipeline is the retry mechanism.
    pub async fn generate(&self, index: usize, text: &str) -> Result<AudioArtifact> {
        let path = self.cache.path_for(index);

        let result = self.synthesize_to(index, text, &path).await;
        if result.is_err() && path.exists() {
            let _ = std::fs::remove_file(&path);
        }
        result
    }

    async fn synthesize_to(&self, index: usize, text: &str, path: &Path) -> Result<AudioArtifact> {
        let audio = self
            .backend
            .synthesize(text)
            .await
            .with_context(|| format!("Speech synthesis failed for chunk {}", index))?;

        write_wav(path, &audio)?;

        Ok(AudioArtifact {
            chunk_index: index,
            file_path: path.to_path_buf(),
            duration_ms: audio.duration_ms(),
        })
    }
}
