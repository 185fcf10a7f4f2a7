mod source;

#[cfg(test)]
mod tests;

pub use source::{load_csv, load_lines, CSV_PRODUCT_COLUMN, CSV_REVIEW_COLUMN};

use crate::review::ReviewRequest;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Product id the replayed reviews are filed under
pub const DEFAULT_TARGET_PRODUCT: &str = "id-001";

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV input has no {0:?} column")]
    MissingColumn(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub sent: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Replays review text against the review endpoint
pub struct Simulator {
    http: Client,
    url: String,
    token: String,
    product_id: String,
}

impl Simulator {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            token: token.into(),
            product_id: DEFAULT_TARGET_PRODUCT.to_string(),
        }
    }

    pub fn product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }

    /// Submit one review; returns the HTTP status
    pub async fn send(&self, review: &str) -> Result<reqwest::StatusCode, SimulationError> {
        let payload = ReviewRequest::write(self.product_id.clone(), review);
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;
        Ok(response.status())
    }

    /// Send every review `rounds` times, pausing between rounds.
    ///
    /// A failed request is logged and counted; it does not stop the replay.
    pub async fn replay(&self, reviews: &[String], rounds: usize, pause: Duration) -> SimulationReport {
        let mut report = SimulationReport::default();

        for round in 0..rounds {
            for (index, review) in reviews.iter().enumerate() {
                report.sent += 1;
                match self.send(review).await {
                    Ok(status) if status.is_success() => {
                        tracing::debug!(round, index, %status, "review sent");
                        report.succeeded += 1;
                    }
                    Ok(status) => {
                        tracing::warn!(round, index, %status, "review rejected");
                        report.failed += 1;
                    }
                    Err(e) => {
                        tracing::warn!(round, index, error = %e, "review request failed");
                        report.failed += 1;
                    }
                }
            }

            tracing::info!(round = round + 1, sent = report.sent, "round finished");
            if round + 1 < rounds {
                tokio::time::sleep(pause).await;
            }
        }

        report
    }
}
