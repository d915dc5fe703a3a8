//! Word-count ledger persisted across runs.
//!
//! A reporting side-channel only: the pipeline never reads it back. Entries
//! are keyed by document name and merged into whatever the file already
//! holds, so runs for different documents never clobber each other.

use crate::text::TextChunk;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Word-count statistics for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Total words across all chunks
    pub total_words: usize,
    /// Per-chunk word counts, keyed by chunk index
    pub chunks: BTreeMap<usize, usize>,
    /// When this entry was last written
    pub updated_at: DateTime<Utc>,
}

/// The persisted ledger: document name to stats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordCountLedger {
    #[serde(default)]
    pub documents: BTreeMap<String, DocumentStats>,
}

impl WordCountLedger {
    /// Load the ledger, returning an empty one if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open ledger: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse ledger: {}", path.display()))
    }

    /// Save the ledger, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create ledger: {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).context("Failed to write ledger JSON")?;
        Ok(())
    }

    /// Insert or replace the entry for one document.
    pub fn record(&mut self, document: &str, chunks: &[TextChunk]) {
        let stats = DocumentStats {
            total_words: chunks.iter().map(|c| c.word_count).sum(),
            chunks: chunks.iter().map(|c| (c.index, c.word_count)).collect(),
            updated_at: Utc::now(),
        };
        self.documents.insert(document.to_string(), stats);
    }
}

/// Read-merge-write one document's stats into the ledger file.
pub fn record_document(path: &Path, document: &str, chunks: &[TextChunk]) -> Result<()> {
    let mut ledger = WordCountLedger::load(path)?;
    ledger.record(document, chunks);
    ledger.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn chunks(counts: &[usize]) -> Vec<TextChunk> {
        counts
            .iter()
            .enumerate()
            .map(|(i, n)| TextChunk::new(i, vec!["word"; *n].join(" ")))
            .collect()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let ledger = WordCountLedger::load(&temp.path().join("ledger.json")).unwrap();
        assert!(ledger.documents.is_empty());
    }

    #[test]
    fn test_record_totals() {
        let mut ledger = WordCountLedger::default();
        ledger.record("intro", &chunks(&[10, 20, 5]));

        let stats = &ledger.documents["intro"];
        assert_eq!(stats.total_words, 35);
        assert_eq!(stats.chunks[&1], 20);
    }

    #[test]
    fn test_merge_preserves_other_documents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ledger.json");

        record_document(&path, "chapter-1", &chunks(&[100])).unwrap();
        record_document(&path, "chapter-2", &chunks(&[200, 50])).unwrap();
        // Re-record chapter-1 with new numbers
        record_document(&path, "chapter-1", &chunks(&[40, 40])).unwrap();

        let ledger = WordCountLedger::load(&path).unwrap();
        assert_eq!(ledger.documents.len(), 2);
        assert_eq!(ledger.documents["chapter-1"].total_words, 80);
        assert_eq!(ledger.documents["chapter-2"].total_words, 250);
    }
}
