use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language assumed when a request does not name one
pub const DEFAULT_LANGUAGE: &str = "en";

/// Body of `POST /review`, as sent by clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReviewRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ProductId is missing or empty")]
    MissingProductId,

    #[error("Review is missing or empty")]
    MissingReview,
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReview {
    pub product_id: String,
    pub review: String,
    pub language: String,
}

impl ReviewRequest {
    pub fn write(product_id: impl Into<String>, review: impl Into<String>) -> Self {
        Self {
            action: Some("write".to_string()),
            product_id: Some(product_id.into()),
            review: Some(review.into()),
            language: None,
        }
    }

    /// Check required fields and fill in the default language
    pub fn validate(self) -> Result<ValidReview, ValidationError> {
        let product_id = self
            .product_id
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::MissingProductId)?;
        let review = self
            .review
            .filter(|text| !text.is_empty())
            .ok_or(ValidationError::MissingReview)?;
        let language = self
            .language
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(ValidReview {
            product_id,
            review,
            language,
        })
    }
}
