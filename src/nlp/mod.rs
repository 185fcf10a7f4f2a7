mod client;
mod error;
mod types;


pub use client::NlpClient;
pub use error::NlpError;
pub use types::{
    BatchEntitiesResponse, BatchItemError, BatchSyntaxResponse, BatchTextRequest,
    DetectSentimentRequest, EntitiesResult, HealthResponse, SyntaxResult,
};

use crate::review::{Entity, Sentiment, SyntaxToken};
use std::future::Future;

/// Most documents the service accepts in one batch call
pub const MAX_BATCH_DOCUMENTS: usize = 25;

/// Scores a single review
pub trait SentimentAnalyzer: Send + Sync {
    fn detect_sentiment(
        &self,
        text: &str,
        language: &str,
    ) -> impl Future<Output = Result<Sentiment, NlpError>> + Send;
}

/// Bulk entity and syntax extraction.
///
/// Results are positional: element `i` belongs to `texts[i]`.
pub trait TextAnalyzer: Send + Sync {
    fn batch_detect_entities(
        &self,
        texts: &[String],
        language: &str,
    ) -> impl Future<Output = Result<Vec<Vec<Entity>>, NlpError>> + Send;

    fn batch_detect_syntax(
        &self,
        texts: &[String],
        language: &str,
    ) -> impl Future<Output = Result<Vec<Vec<SyntaxToken>>, NlpError>> + Send;
}
