use thiserror::Error;

/// Errors from the chat-completion collaborator.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode completion payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("completion contained no answer")]
    EmptyCompletion,
}
