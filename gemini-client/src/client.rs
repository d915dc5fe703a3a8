//! HTTP client for the Generative Language API.
//!
//! Both operations go through the `generateContent` endpoint: text
//! completions return text parts, speech synthesis returns a base64
//! inline-data part containing raw PCM (s16le, mono, 24 kHz).

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{GeminiError, Result};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Client for the Generative Language API.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a client from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| GeminiError::MissingApiKey {
            env_var: API_KEY_ENV.to_string(),
        })?;
        Ok(Self::new(api_key))
    }

    /// Override the base URL (used by tests against a local server).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Run a text completion and return the concatenated text parts.
    pub async fn generate_text(&self, model: &str, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: None,
        };

        let response = self.generate_content(model, &request).await?;
        let parts = response.into_parts()?;

        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() {
            return Err(GeminiError::MalformedResponse(
                "response contained no text parts".to_string(),
            ));
        }
        Ok(text)
    }

    /// Synthesize speech for a piece of text, returning raw PCM bytes.
    ///
    /// The service answers with s16le samples at 24 kHz, mono; the caller is
    /// responsible for wrapping them in a container format.
    pub async fn synthesize_speech(
        &self,
        model: &str,
        voice: &str,
        text: &str,
    ) -> Result<Vec<u8>> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(text)],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.to_string(),
                        },
                    },
                }),
            }),
        };

        let response = self.generate_content(model, &request).await?;
        let parts = response.into_parts()?;

        let inline = parts
            .into_iter()
            .find_map(|p| p.inline_data)
            .ok_or_else(|| {
                GeminiError::MalformedResponse("response contained no audio data".to_string())
            })?;

        Ok(BASE64.decode(inline.data)?)
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    error_response.error.message
                } else {
                    error_text
                };
            return Err(GeminiError::ApiError {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        Ok(response.json().await?)
    }
}

// API request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn into_parts(self) -> Result<Vec<ResponsePart>> {
        self.candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts)
            .ok_or_else(|| {
                GeminiError::MalformedResponse("response contained no candidates".to_string())
            })
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_response() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Hello "}, {"text": "world"}]}}
            ]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let parts = response.into_parts().unwrap();
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn test_parse_audio_response() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [
                    {"inlineData": {"mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAAA"}}
                ]}}
            ]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let parts = response.into_parts().unwrap();
        let inline = parts.into_iter().find_map(|p| p.inline_data).unwrap();
        assert_eq!(BASE64.decode(inline.data).unwrap(), vec![0u8, 0, 0]);
    }

    #[test]
    fn test_parse_empty_candidates() {
        let json = r#"{"candidates": []}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_parts().is_err());
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{"error": {"code": 429, "message": "Resource exhausted"}}"#;
        let response: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.error.message, "Resource exhausted");
    }

    #[test]
    fn test_speech_request_serialization() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text("Read this aloud.")],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: "Charon".to_string(),
                        },
                    },
                }),
            }),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["generationConfig"]["responseModalities"][0],
            "AUDIO"
        );
        assert_eq!(
            json["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Charon"
        );
    }

    #[test]
    fn test_missing_api_key_from_env() {
        // A deliberately unset variable name would race with other tests;
        // exercise the error type directly instead.
        let err = GeminiError::MissingApiKey {
            env_var: API_KEY_ENV.to_string(),
        };
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
