//! On-disk cache of per-chunk audio artifacts.
//!
//! Artifacts are keyed by chunk index in a fixed naming scheme
//! (`chunk_<index>.wav`), which makes the cache the resumability mechanism:
//! a re-run regenerates only the indices with no file on disk. Two workers
//! never write the same path because indices are unique.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory of chunk artifacts, keyed by chunk index.
#[derive(Debug, Clone)]
pub struct ChunkCache {
    dir: PathBuf,
}

impl ChunkCache {
    /// Open (creating if needed) a cache at the given directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// The cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Artifact path for a chunk index.
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("chunk_{}.wav", index))
    }

    /// Whether an artifact for this index already exists.
    pub fn exists(&self, index: usize) -> bool {
        self.path_for(index).exists()
    }

    /// List cached artifacts in numeric index order.
    ///
    /// Directory listings are lexical, so `chunk_10` would otherwise sort
    /// before `chunk_9`; sorting by the parsed index restores chunk order.
    pub fn sorted_entries(&self) -> Result<Vec<(usize, PathBuf)>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read cache directory: {}", self.dir.display()))?
        {
            let path = entry?.path();
            if let Some(index) = parse_index(&path) {
                entries.push((index, path));
            }
        }

        entries.sort_by_key(|(index, _)| *index);
        Ok(entries)
    }
}

/// Parse the chunk index out of an artifact path (`chunk_<index>.wav`).
pub fn parse_index(path: &Path) -> Option<usize> {
    let name = path.file_name()?.to_str()?;
    name.strip_prefix("chunk_")?
        .strip_suffix(".wav")?
        .parse()
        .ok()
}
