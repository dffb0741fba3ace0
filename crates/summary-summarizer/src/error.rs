//! Error types for the summarizer adapter.

use summary_models::AdapterError;
use thiserror::Error;

pub type SummarizerResult<T> = Result<T, SummarizerError>;

#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("transcript is empty")]
    EmptyTranscript,

    #[error("transcript exceeds {max} chars ({actual} chars)")]
    TranscriptTooLarge { max: usize, actual: usize },

    #[error("connection to LLM server failed: {0}")]
    ConnectionFailed(String),

    #[error("request to LLM server timed out")]
    Timeout,

    #[error("LLM server returned an error: {0}")]
    ServerError(String),

    #[error("could not parse LLM response: {0}")]
    ParseFailed(String),

    #[error("model {0} is not available")]
    ModelUnavailable(String),
}

impl From<SummarizerError> for AdapterError {
    fn from(err: SummarizerError) -> Self {
        match err {
            SummarizerError::EmptyTranscript | SummarizerError::TranscriptTooLarge { .. } => {
                AdapterError::input(err.to_string())
            }
            SummarizerError::ConnectionFailed(_) | SummarizerError::Timeout => {
                AdapterError::transient(err.to_string())
            }
            SummarizerError::ServerError(_)
            | SummarizerError::ParseFailed(_)
            | SummarizerError::ModelUnavailable(_) => AdapterError::fatal(err.to_string()),
        }
    }
}
