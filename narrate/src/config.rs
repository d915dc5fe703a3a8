//! narrate configuration management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_VOICE: &str = "Charon";
const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
const DEFAULT_CLEAN_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_MAX_PART_MINUTES: u64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrateConfig {
    /// Prebuilt voice name used for synthesis
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Model used for speech synthesis
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Model used for the optional narration cleanup
    #[serde(default = "default_clean_model")]
    pub clean_model: String,

    /// Maximum chunk size in words
    #[serde(default = "default_chunk_words")]
    pub chunk_words: usize,

    /// Maximum duration of a merged part in minutes
    #[serde(default = "default_max_part_minutes")]
    pub max_part_minutes: u64,
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_tts_model() -> String {
    DEFAULT_TTS_MODEL.to_string()
}

fn default_clean_model() -> String {
    DEFAULT_CLEAN_MODEL.to_string()
}

fn default_chunk_words() -> usize {
    crate::text::chunker::DEFAULT_MAX_WORDS
}

fn default_max_part_minutes() -> u64 {
    DEFAULT_MAX_PART_MINUTES
}

impl Default for NarrateConfig {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            tts_model: default_tts_model(),
            clean_model: default_clean_model(),
            chunk_words: default_chunk_words(),
            max_part_minutes: default_max_part_minutes(),
        }
    }
}

impl NarrateConfig {
    /// Get the config file path: ~/.config/cli-programs/narrate.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("narrate.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: NarrateConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}
