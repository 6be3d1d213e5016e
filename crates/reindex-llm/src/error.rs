//! Error types for LLM structuring.

use thiserror::Error;

/// Result type alias for LLM operations
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur while structuring text through the LLM
#[derive(Debug, Error)]
pub enum LlmError {
    /// `OPENAI_API_KEY` is unset or empty
    #[error("OPENAI_API_KEY not set in environment")]
    MissingApiKey,

    /// Transport-level failure talking to the endpoint
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// The model's reply was not the JSON shape the prompt asked for
    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),

    /// The reply contained no choices / no content
    #[error("Empty LLM response")]
    EmptyResponse,
}
