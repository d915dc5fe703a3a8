//! Text processing for TTS: chunking, cleaning, and remote rewriting.

pub mod chunker;
mod cleaner;
pub mod rewrite;

pub use chunker::ChunkLimit;

/// A chunk of text ready for TTS processing.
///
/// Chunks carry a stable 0-based index; the index keys the on-disk artifact
/// cache and re-imposes ordering when audio is assembled.
#[derive(Debug, Clone)]
pub struct TextChunk {
    /// Position in the chunk sequence
    pub index: usize,
    /// The text content
    pub text: String,
    /// Number of whitespace-separated words in `text`
    pub word_count: usize,
}

impl TextChunk {
    /// Create a new text chunk, deriving the word count from the text.
    pub fn new(index: usize, text: String) -> Self {
        let word_count = text.split_whitespace().count();
        Self {
            index,
            text,
            word_count,
        }
    }
}
