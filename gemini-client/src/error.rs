use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("API key not found. Set the {env_var} environment variable.")]
    MissingApiKey { env_var: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to decode audio payload: {0}")]
    AudioDecode(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, GeminiError>;
