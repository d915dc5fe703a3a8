//! Audio assembly using FFmpeg.
//!
//! Two independent operations over the chunk cache: concatenating every
//! available artifact into one final file, and merging artifacts into
//! numbered parts bounded by a maximum playback duration. Codec work is
//! delegated entirely to the `ffmpeg`/`ffprobe` binaries.

use super::MergedPart;
use crate::cache::ChunkCache;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Get duration of an audio file in milliseconds using ffprobe.
pub fn audio_duration_ms(audio_path: &Path) -> Result<u64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(audio_path)
        .output()
        .context("Failed to run ffprobe")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("ffprobe failed for {}: {}", audio_path.display(), stderr);
    }

    let duration_str = String::from_utf8_lossy(&output.stdout);
    let duration_secs: f64 = duration_str
        .trim()
        .parse()
        .context("Failed to parse duration")?;

    Ok((duration_secs * 1000.0) as u64)
}

/// How concatenated audio is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConcatMode {
    /// Lossless stream copy; inputs and output must share a format.
    Copy,
    /// Re-encode to whatever container/codec the output extension implies.
    Encode,
}

/// Concatenate audio files in the given order with FFmpeg's concat demuxer.
fn concatenate(audio_files: &[PathBuf], output_path: &Path, mode: ConcatMode) -> Result<()> {
    if audio_files.is_empty() {
        anyhow::bail!("No audio files provided");
    }

    if audio_files.len() == 1 && mode == ConcatMode::Copy {
        std::fs::copy(&audio_files[0], output_path)?;
        return Ok(());
    }

    let temp_dir = TempDir::new()?;
    let list_file = temp_dir.path().join("concat_list.txt");

    let mut list_content = String::new();
    for path in audio_files {
        // Escape single quotes in path
        let path_str = path.to_string_lossy().replace('\'', "'\\''");
        list_content.push_str(&format!("file '{}'\n", path_str));
    }
    std::fs::write(&list_file, &list_content)?;

    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-y", "-f", "concat", "-safe", "0", "-i"])
        .arg(&list_file);
    if mode == ConcatMode::Copy {
        cmd.args(["-c", "copy"]);
    }
    cmd.arg(output_path);

    let output = cmd.output().context("Failed to run ffmpeg concat")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("ffmpeg concat failed: {}", stderr);
    }

    Ok(())
}

/// Concatenate all available chunk artifacts for indices `[0, total)` into
/// one final file, re-encoded per the output extension.
///
/// Missing indices are skipped; an artifact that ffprobe cannot read is
/// skipped with a warning so one corrupt file does not waste the rest of a
/// resumed run. Zero usable artifacts is fatal. Returns the number of
/// chunks included.
pub fn concatenate_chunks(cache: &ChunkCache, total: usize, output_path: &Path) -> Result<usize> {
    let mut files = Vec::new();

    for index in 0..total {
        let path = cache.path_for(index);
        if !path.exists() {
            continue;
        }
        match audio_duration_ms(&path) {
            Ok(_) => files.push(path),
            Err(e) => log::warn!("Skipping unreadable artifact for chunk {}: {}", index, e),
        }
    }

    if files.is_empty() {
        anyhow::bail!("No audio chunks were generated or found");
    }

    let included = files.len();
    concatenate(&files, output_path, ConcatMode::Encode)?;
    Ok(included)
}

/// Greedily group chunk durations into parts bounded by `max_ms`.
///
/// A part is flushed when adding the next chunk would push it over the
/// limit; a single chunk longer than the limit still gets a part of its
/// own. Returns groups of positions into the input slice, in order.
fn plan_parts(durations_ms: &[u64], max_ms: u64) -> Vec<Vec<usize>> {
    let mut parts = Vec::new();
    let mut current = Vec::new();
    let mut current_ms = 0u64;

    for (pos, &duration) in durations_ms.iter().enumerate() {
        if !current.is_empty() && current_ms + duration > max_ms {
            parts.push(std::mem::take(&mut current));
            current_ms = 0;
        }
        current.push(pos);
        current_ms += duration;
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

/// Merge cached chunk artifacts into duration-bounded part files.
///
/// Chunks are taken in numeric index order; each part is written as
/// `part_<n>.wav` (1-based) via lossless stream copy.
pub fn merge_into_parts(
    cache: &ChunkCache,
    output_dir: &Path,
    max_ms: u64,
) -> Result<Vec<MergedPart>> {
    let entries = cache.sorted_entries()?;
    if entries.is_empty() {
        anyhow::bail!("No chunk files found in {}", cache.dir().display());
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut durations = Vec::with_capacity(entries.len());
    for (index, path) in &entries {
        let duration = audio_duration_ms(path)
            .with_context(|| format!("Failed to probe chunk {}", index))?;
        durations.push(duration);
    }

    let mut parts = Vec::new();
    for (i, group) in plan_parts(&durations, max_ms).into_iter().enumerate() {
        let part_number = i + 1;
        let file_path = output_dir.join(format!("part_{}.wav", part_number));
        let duration_ms: u64 = group.iter().map(|&pos| durations[pos]).sum();

        let files: Vec<PathBuf> = group.iter().map(|&pos| entries[pos].1.clone()).collect();
        log::info!(
            "Exporting {} ({:.2} seconds)",
            file_path.display(),
            duration_ms as f64 / 1000.0
        );
        concatenate(&files, &file_path, ConcatMode::Copy)?;

        parts.push(MergedPart {
            part_number,
            file_path,
            duration_ms,
        });
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60_000;

    #[test]
    fn test_plan_single_part() {
        let parts = plan_parts(&[1000, 2000, 3000], 10_000);
        assert_eq!(parts, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_plan_flushes_before_limit_exceeded() {
        // 5 min + 12 min chunks against a 15 min limit: the second chunk
        // would push the part to 17 min, so it starts part 2.
        let parts = plan_parts(&[5 * MIN, 12 * MIN], 15 * MIN);
        assert_eq!(parts, vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_plan_every_part_within_limit() {
        let durations = vec![4 * MIN, 4 * MIN, 4 * MIN, 4 * MIN, 4 * MIN];
        let parts = plan_parts(&durations, 10 * MIN);
        assert_eq!(parts, vec![vec![0, 1], vec![2, 3], vec![4]]);
        for part in &parts {
            let total: u64 = part.iter().map(|&i| durations[i]).sum();
            assert!(total <= 10 * MIN);
        }
    }

    #[test]
    fn test_plan_oversized_chunk_still_emitted() {
        let parts = plan_parts(&[20 * MIN, 2 * MIN], 15 * MIN);
        assert_eq!(parts, vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_plan_exact_fit_stays_in_part() {
        let parts = plan_parts(&[10 * MIN, 5 * MIN], 15 * MIN);
        assert_eq!(parts, vec![vec![0, 1]]);
    }

    #[test]
    fn test_plan_last_part_flushed_even_with_one_chunk() {
        let parts = plan_parts(&[14 * MIN, 14 * MIN, MIN], 15 * MIN);
        assert_eq!(parts, vec![vec![0], vec![1, 2]]);
    }

    #[test]
    fn test_plan_empty() {
        assert!(plan_parts(&[], 15 * MIN).is_empty());
    }

    #[test]
    fn test_concatenate_rejects_empty_input() {
        let temp = TempDir::new().unwrap();
        let result = concatenate(&[], &temp.path().join("out.wav"), ConcatMode::Copy);
        assert!(result.is_err());
    }

    #[test]
    fn test_concatenate_chunks_zero_artifacts_fatal() {
        // Missing artifacts are skipped, but an entirely empty cache must
        // fail before any ffmpeg invocation.
        let temp = TempDir::new().unwrap();
        let cache = ChunkCache::open(temp.path()).unwrap();

        let output = temp.path().join("final.mp3");
        let result = concatenate_chunks(&cache, 5, &output);

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_concatenate_single_file_copies() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("chunk_0.wav");
        std::fs::write(&input, b"fake wav bytes").unwrap();

        let output = temp.path().join("out.wav");
        concatenate(&[input.clone()], &output, ConcatMode::Copy).unwrap();
        assert_eq!(
            std::fs::read(&output).unwrap(),
            std::fs::read(&input).unwrap()
        );
    }

    // Full concatenation and merging require ffmpeg plus real audio; those
    // paths are exercised manually against generated output directories.
}
