//! Remote narration cleanup via the text-generation service.
//!
//! The service strips page numbers, headers, footers, and references from a
//! PDF extraction while keeping the remaining wording intact. The cleaned
//! text is persisted next to the input so re-runs skip the remote call.

use anyhow::{Context, Result};
use gemini_client::GeminiClient;
use std::path::{Path, PathBuf};

const CLEANUP_PROMPT: &str = "\
You are an expert text editor specializing in preparing documents for \
text-to-speech narration. Your task is to clean the following text by \
removing any page numbers, headers, footers, references, and any content \
unsuitable for audiobook narration. Keep all remaining wording and titles \
exactly as written and ready for direct input into a TTS service.

Here is the text to be cleaned:

{text}

Here is the cleaned text:";

/// Path of the persisted cleaned text for an input file.
pub fn cleaned_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".cleaned.txt");
    input.with_file_name(name)
}

/// Clean narration text, reusing a previously persisted result if present.
pub async fn clean_for_narration(
    client: &GeminiClient,
    model: &str,
    input: &Path,
    text: &str,
) -> Result<String> {
    let cached = cleaned_path(input);
    if cached.exists() {
        log::info!("Reusing cleaned text at {}", cached.display());
        return tokio::fs::read_to_string(&cached)
            .await
            .with_context(|| format!("Failed to read cleaned text: {}", cached.display()));
    }

    eprintln!("Cleaning text for narration ({})...", model);
    let prompt = CLEANUP_PROMPT.replace("{text}", text);
    let cleaned = client
        .generate_text(model, &prompt)
        .await
        .context("Text cleanup request failed")?;

    tokio::fs::write(&cached, &cleaned)
        .await
        .with_context(|| format!("Failed to write cleaned text: {}", cached.display()))?;
    eprintln!("Cleaned text written to {}", cached.display());

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaned_path() {
        let path = cleaned_path(Path::new("/tmp/pages.txt"));
        assert_eq!(path, PathBuf::from("/tmp/pages.txt.cleaned.txt"));
    }

    #[test]
    fn test_prompt_substitution() {
        let prompt = CLEANUP_PROMPT.replace("{text}", "Chapter One");
        assert!(prompt.contains("Chapter One"));
        assert!(!prompt.contains("{text}"));
    }
}
