use crate::nlp::NlpError;
use crate::stream::StreamError;
use thiserror::Error;

/// Why a batch could not be enriched and published
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("entity detection failed: {0}")]
    Entities(NlpError),

    #[error("syntax detection failed: {0}")]
    Syntax(NlpError),

    #[error("expected {expected} results, got {entities} entity and {syntax} syntax results")]
    ResultMismatch {
        expected: usize,
        entities: usize,
        syntax: usize,
    },

    #[error("failed to encode enriched review: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to publish batch: {0}")]
    Publish(#[from] StreamError),
}
