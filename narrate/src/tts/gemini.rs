//! Speech backend using the Gemini TTS API.

use super::{PcmAudio, SpeechBackend};
use anyhow::Result;
use async_trait::async_trait;
use gemini_client::GeminiClient;
use std::sync::Arc;

/// Speech backend backed by the Gemini `generateContent` audio modality.
///
/// The service answers with raw PCM at 24 kHz mono; the container wrapping
/// happens locally in [`super::write_wav`].
pub struct GeminiSpeech {
    client: Arc<GeminiClient>,
    model: String,
    voice: String,
}

impl GeminiSpeech {
    pub fn new(client: Arc<GeminiClient>, model: &str, voice: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            voice: voice.to_string(),
        }
    }
}

#[async_trait]
impl SpeechBackend for GeminiSpeech {
    async fn synthesize(&self, text: &str) -> Result<PcmAudio> {
        let data = self
            .client
            .synthesize_speech(&self.model, &self.voice, text)
            .await?;
        Ok(PcmAudio::mono_24khz(data))
    }
}
