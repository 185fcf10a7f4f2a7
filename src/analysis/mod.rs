mod error;
mod worker;


pub use error::AnalysisError;
pub use worker::{AnalysisWorker, WorkerPass, DEFAULT_CONSUMER, DEFAULT_EVENT_BATCH_SIZE};

use crate::batcher::{BatchError, Batcher};
use crate::nlp::TextAnalyzer;
use crate::review::{ReviewItem, DEFAULT_LANGUAGE};
use crate::store::ChangeEvent;
use crate::stream::{StreamPublisher, StreamRecord};
use serde::Serialize;

/// Outcome of one `handle` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// Events that were not inserts and so were ignored
    pub skipped: usize,
    pub batches: usize,
    pub published: usize,
}

/// Enriches newly inserted reviews with entities and syntax, then publishes
/// them to a stream in batches.
pub struct ReviewAnalysis<A, P> {
    analyzer: A,
    publisher: P,
    batcher: Batcher,
    stream_name: String,
    language: String,
}

impl<A: TextAnalyzer, P: StreamPublisher> ReviewAnalysis<A, P> {
    pub fn new(analyzer: A, publisher: P, batcher: Batcher, stream_name: impl Into<String>) -> Self {
        Self {
            analyzer,
            publisher,
            batcher,
            stream_name: stream_name.into(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Process one delivery of change events.
    ///
    /// Only INSERT events are analyzed. Batches go out strictly one after
    /// another; the first failing batch ends the call and later batches are
    /// not attempted. Batches already published stay published.
    pub async fn handle(
        &self,
        events: &[ChangeEvent],
    ) -> Result<AnalysisReport, BatchError<AnalysisError>> {
        let items: Vec<ReviewItem> = events
            .iter()
            .filter_map(|event| event.inserted().cloned())
            .collect();
        let skipped = events.len() - items.len();

        let dispatched = self
            .batcher
            .process_async(items, |batch| async move { self.publish_batch(batch).await })
            .await?;

        Ok(AnalysisReport {
            skipped,
            batches: dispatched.batches,
            published: dispatched.records,
        })
    }

    async fn publish_batch(&self, batch: Vec<ReviewItem>) -> Result<(), AnalysisError> {
        let texts: Vec<String> = batch.iter().map(|item| item.review.clone()).collect();

        let entities = self
            .analyzer
            .batch_detect_entities(&texts, &self.language)
            .await
            .map_err(AnalysisError::Entities)?;
        let syntax = self
            .analyzer
            .batch_detect_syntax(&texts, &self.language)
            .await
            .map_err(AnalysisError::Syntax)?;

        if entities.len() != batch.len() || syntax.len() != batch.len() {
            return Err(AnalysisError::ResultMismatch {
                expected: batch.len(),
                entities: entities.len(),
                syntax: syntax.len(),
            });
        }

        let records = batch
            .into_iter()
            .zip(entities)
            .zip(syntax)
            .map(|((item, entities), syntax)| -> Result<StreamRecord, AnalysisError> {
                let enriched = item.enrich(entities, syntax);
                Ok(StreamRecord {
                    data: serde_json::to_string(&enriched)?,
                    partition_key: enriched.product_id,
                })
            })
            .collect::<Result<Vec<_>, AnalysisError>>()?;

        let count = records.len();
        self.publisher
            .put_records(&self.stream_name, records)
            .await?;

        tracing::info!(stream = %self.stream_name, records = count, "batch published");
        Ok(())
    }
}
