mod response;


pub use response::{ApiResponse, ReviewResponse, Status};

use crate::nlp::{NlpError, SentimentAnalyzer};
use crate::review::{DateMode, ReviewItem, ReviewRequest};
use crate::store::ReviewTable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("sentiment analysis failed: {0}")]
    Sentiment(#[from] NlpError),

    #[error("failed to store review: {0:#}")]
    Store(anyhow::Error),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Handles review submissions: validate, score, store, answer
pub struct ReviewBackend<S, T> {
    analyzer: S,
    table: T,
    date_mode: DateMode,
}

impl<S: SentimentAnalyzer, T: ReviewTable> ReviewBackend<S, T> {
    pub fn new(analyzer: S, table: T) -> Self {
        Self {
            analyzer,
            table,
            date_mode: DateMode::Now,
        }
    }

    pub fn date_mode(mut self, date_mode: DateMode) -> Self {
        self.date_mode = date_mode;
        self
    }

    /// Process one raw request body.
    ///
    /// Invalid input is answered (`Status: fail`), not returned as an error;
    /// errors are reserved for the NLP service and the table.
    pub async fn handle(&self, body: &str) -> Result<ApiResponse, BackendError> {
        let request: ReviewRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "malformed review request");
                return ApiResponse::json(400, &ReviewResponse::fail());
            }
        };

        let review = match request.validate() {
            Ok(review) => review,
            Err(e) => {
                tracing::info!(reason = %e, "review rejected");
                return ApiResponse::json(200, &ReviewResponse::fail());
            }
        };

        let sentiment = self
            .analyzer
            .detect_sentiment(&review.review, &review.language)
            .await?;

        let item = ReviewItem::new(review, sentiment.clone(), self.date_mode);
        self.table.put_item(&item).map_err(BackendError::Store)?;

        tracing::info!(
            product_id = %item.product_id,
            review_id = %item.review_id,
            sentiment = ?sentiment.sentiment,
            "review stored"
        );

        ApiResponse::json(200, &ReviewResponse::success(sentiment))
    }
}
