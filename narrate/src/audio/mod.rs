//! Audio artifact types and assembly.

pub mod assembler;

use std::path::PathBuf;

/// A generated (or cached) audio file for one chunk.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    /// Index of the chunk this audio was synthesized from
    pub chunk_index: usize,
    /// Location on disk
    pub file_path: PathBuf,
    /// Playback duration in milliseconds
    pub duration_ms: u64,
}

/// A merged output part bounded by the configured maximum duration.
#[derive(Debug, Clone)]
pub struct MergedPart {
    /// 1-based part number, contiguous across the merge
    pub part_number: usize,
    /// Location on disk
    pub file_path: PathBuf,
    /// Total playback duration in milliseconds
    pub duration_ms: u64,
}
