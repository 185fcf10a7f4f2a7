use crate::review::Sentiment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
}

/// JSON body returned to review submitters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReviewResponse {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Sentiment>,
}

impl ReviewResponse {
    pub fn success(sentiment: Sentiment) -> Self {
        Self {
            status: Status::Success,
            result: Some(sentiment),
        }
    }

    pub fn fail() -> Self {
        Self {
            status: Status::Fail,
            result: None,
        }
    }
}

/// Transport-neutral HTTP answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    pub fn json<B: Serialize>(status_code: u16, body: &B) -> Result<Self, super::BackendError> {
        Ok(Self {
            status_code,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: serde_json::to_string(body)?,
        })
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
    }
}
