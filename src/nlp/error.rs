use thiserror::Error;

#[derive(Debug, Error)]
pub enum NlpError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("NLP service returned error status {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("document {index} failed: {code}: {message}")]
    BatchItemFailed {
        index: u32,
        code: String,
        message: String,
    },

    #[error("expected {expected} results, got {got}")]
    ResultMismatch { expected: usize, got: usize },

    #[error("batch of {size} documents exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("text must not be empty")]
    EmptyText,
}
