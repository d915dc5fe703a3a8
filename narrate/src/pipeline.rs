//! Parallel fan-out of per-chunk speech generation.
//!
//! Each pending chunk becomes one tokio task, bounded by a semaphore sized
//! to the machine's available parallelism. Completion order is arbitrary;
//! artifacts are re-sorted by chunk index before they are returned. One
//! chunk's failure never cancels its siblings.

use crate::audio::AudioArtifact;
use crate::cache::ChunkCache;
use crate::text::TextChunk;
use crate::tts::SpeechGenerator;
use anyhow::anyhow;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Progress snapshot reported after each completed unit.
#[derive(Debug, Clone, Copy)]
pub struct DispatchProgress {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Worker pool size: one task slot per available core.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// The chunks that still need an artifact: anything already in the cache
/// is never regenerated. This filter is the resumability guarantee; only
/// its output may be handed to [`generate_all`].
pub fn pending_chunks(cache: &ChunkCache, chunks: &[TextChunk]) -> Vec<TextChunk> {
    chunks
        .iter()
        .filter(|c| !cache.exists(c.index))
        .cloned()
        .collect()
}

/// Generate artifacts for every chunk concurrently.
///
/// Returns the successful artifacts in chunk-index order. Failures are
/// logged with their chunk index and reflected in the progress counts; the
/// caller decides whether zero successes is fatal.
pub async fn generate_all<F>(
    generator: Arc<SpeechGenerator>,
    chunks: Vec<TextChunk>,
    workers: usize,
    mut on_progress: F,
) -> Vec<AudioArtifact>
where
    F: FnMut(DispatchProgress),
{
    let total = chunks.len();
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();

    for chunk in chunks {
        let generator = Arc::clone(&generator);
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return (chunk.index, Err(anyhow!("worker pool closed"))),
            };
            let result = generator.generate(chunk.index, &chunk.text).await;
            (chunk.index, result)
        });
    }

    let mut artifacts = Vec::new();
    let mut completed = 0;
    let mut failed = 0;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(artifact))) => {
                completed += 1;
                artifacts.push(artifact);
            }
            Ok((index, Err(e))) => {
                failed += 1;
                log::warn!("Chunk {} failed: {:#}", index, e);
            }
            Err(e) => {
                // A panicked worker is logged like any other failure
                failed += 1;
                log::warn!("A worker task aborted unexpectedly: {}", e);
            }
        }

        on_progress(DispatchProgress {
            total,
            completed,
            failed,
        });
    }

    artifacts.sort_by_key(|a| a.chunk_index);
    artifacts
}
