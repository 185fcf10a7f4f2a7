mod error;
mod jsonl;

#[cfg(test)]
mod tests;

pub use error::StreamError;
pub use jsonl::{shard_for, JsonlStream, StoredRecord};

use serde::{Deserialize, Serialize};
use std::future::Future;

/// Stream name used when none is configured
pub const DEFAULT_STREAM_NAME: &str = "ReviewAnalysisStream";

/// A record to publish: a JSON document plus the key that picks its shard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamRecord {
    pub data: String,
    pub partition_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutRecordResult {
    pub shard_id: String,
    pub sequence_number: String,
}

/// Per-record placement, in the order the records were given
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutRecordsOutput {
    pub records: Vec<PutRecordResult>,
}

/// Bulk publisher for enriched records
pub trait StreamPublisher: Send + Sync {
    fn put_records(
        &self,
        stream_name: &str,
        records: Vec<StreamRecord>,
    ) -> impl Future<Output = Result<PutRecordsOutput, StreamError>> + Send;
}
