//! Shared Gemini API client for the narrate workspace
//!
//! Provides a thin interface over the Generative Language API for the two
//! remote operations the pipeline needs:
//! - text generation (narration cleanup)
//! - speech synthesis (raw PCM audio)

pub mod client;
pub mod error;

pub use client::{API_KEY_ENV, GeminiClient};
pub use error::{GeminiError, Result};
