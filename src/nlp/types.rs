// the NLP service contract
use crate::review::{Entity, SyntaxToken};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectSentimentRequest<'a> {
    pub text: &'a str,
    pub language_code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchTextRequest<'a> {
    pub text_list: &'a [String],
    pub language_code: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchItemError {
    pub index: u32,
    pub error_code: String,
    pub error_message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntitiesResult {
    pub index: u32,
    pub entities: Vec<Entity>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchEntitiesResponse {
    pub result_list: Vec<EntitiesResult>,
    #[serde(default)]
    pub error_list: Vec<BatchItemError>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyntaxResult {
    pub index: u32,
    pub syntax_tokens: Vec<SyntaxToken>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchSyntaxResponse {
    pub result_list: Vec<SyntaxResult>,
    #[serde(default)]
    pub error_list: Vec<BatchItemError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Put batch results back in request order, failing on any per-document error
pub(crate) fn order_results<T>(
    expected: usize,
    results: impl IntoIterator<Item = (u32, T)>,
    errors: Vec<BatchItemError>,
) -> Result<Vec<T>, super::NlpError> {
    if let Some(first) = errors.into_iter().next() {
        return Err(super::NlpError::BatchItemFailed {
            index: first.index,
            code: first.error_code,
            message: first.error_message,
        });
    }

    let mut slots: Vec<Option<T>> = (0..expected).map(|_| None).collect();
    let mut got = 0;
    for (index, value) in results {
        got += 1;
        let slot = slots
            .get_mut(index as usize)
            .ok_or(super::NlpError::ResultMismatch { expected, got })?;
        if slot.is_some() {
            return Err(super::NlpError::ResultMismatch { expected, got });
        }
        *slot = Some(value);
    }

    slots
        .into_iter()
        .collect::<Option<Vec<T>>>()
        .ok_or(super::NlpError::ResultMismatch { expected, got })
}
