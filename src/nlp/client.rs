// client.rs - the HTTP client for the NLP service
use super::types::*;
use super::{NlpError, SentimentAnalyzer, TextAnalyzer, MAX_BATCH_DOCUMENTS};
use crate::review::{Entity, Sentiment, SyntaxToken};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Client for the sentiment/entity/syntax service.
///
/// Build one at startup and share it; it holds a connection pool.
#[derive(Debug, Clone)]
pub struct NlpClient {
    http: Client,
    endpoint: String,
}

impl NlpClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, NlpError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check if the NLP service is up
    pub async fn health_check(&self) -> Result<HealthResponse, NlpError> {
        let response = self
            .http
            .get(format!("{}/health", self.endpoint))
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn post_json<Req, Resp>(&self, path: &str, req: &Req) -> Result<Resp, NlpError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}/{}", self.endpoint, path))
            .json(req)
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn read_json<Resp: DeserializeOwned>(response: reqwest::Response) -> Result<Resp, NlpError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NlpError::ServerError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

fn check_batch(texts: &[String]) -> Result<(), NlpError> {
    if texts.len() > MAX_BATCH_DOCUMENTS {
        return Err(NlpError::BatchTooLarge {
            size: texts.len(),
            max: MAX_BATCH_DOCUMENTS,
        });
    }
    if texts.iter().any(|t| t.is_empty()) {
        return Err(NlpError::EmptyText);
    }
    Ok(())
}

impl SentimentAnalyzer for NlpClient {
    async fn detect_sentiment(&self, text: &str, language: &str) -> Result<Sentiment, NlpError> {
        if text.is_empty() || language.is_empty() {
            return Err(NlpError::EmptyText);
        }

        let req = DetectSentimentRequest {
            text,
            language_code: language,
        };
        self.post_json("detect-sentiment", &req).await
    }
}

impl TextAnalyzer for NlpClient {
    async fn batch_detect_entities(
        &self,
        texts: &[String],
        language: &str,
    ) -> Result<Vec<Vec<Entity>>, NlpError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        check_batch(texts)?;

        let req = BatchTextRequest {
            text_list: texts,
            language_code: language,
        };
        let res: BatchEntitiesResponse = self.post_json("batch-detect-entities", &req).await?;

        order_results(
            texts.len(),
            res.result_list.into_iter().map(|r| (r.index, r.entities)),
            res.error_list,
        )
    }

    async fn batch_detect_syntax(
        &self,
        texts: &[String],
        language: &str,
    ) -> Result<Vec<Vec<SyntaxToken>>, NlpError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        check_batch(texts)?;

        let req = BatchTextRequest {
            text_list: texts,
            language_code: language,
        };
        let res: BatchSyntaxResponse = self.post_json("batch-detect-syntax", &req).await?;

        order_results(
            texts.len(),
            res.result_list.into_iter().map(|r| (r.index, r.syntax_tokens)),
            res.error_list,
        )
    }
}
