use super::{AnalysisReport, ReviewAnalysis};
use crate::nlp::TextAnalyzer;
use crate::store::ReviewStore;
use crate::stream::StreamPublisher;
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Checkpoint name used by the analysis worker
pub const DEFAULT_CONSUMER: &str = "review-analysis";

/// Change events pulled from the feed per pass
pub const DEFAULT_EVENT_BATCH_SIZE: usize = 100;

/// What one pass over the change feed did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPass {
    pub events: usize,
    pub checkpoint: i64,
    pub report: AnalysisReport,
}

/// Feeds the review table's change feed into [`ReviewAnalysis`].
///
/// The checkpoint only moves after a page of events was fully handled, so a
/// failed page is delivered again on the next pass.
pub struct AnalysisWorker<A, P> {
    analysis: ReviewAnalysis<A, P>,
    store: Arc<ReviewStore>,
    consumer: String,
    event_batch_size: usize,
    poll_interval: Duration,
}

impl<A: TextAnalyzer, P: StreamPublisher> AnalysisWorker<A, P> {
    pub fn new(analysis: ReviewAnalysis<A, P>, store: Arc<ReviewStore>) -> Self {
        Self {
            analysis,
            store,
            consumer: DEFAULT_CONSUMER.to_string(),
            event_batch_size: DEFAULT_EVENT_BATCH_SIZE,
            poll_interval: Duration::from_secs(1),
        }
    }

    pub fn consumer(mut self, consumer: impl Into<String>) -> Self {
        self.consumer = consumer.into();
        self
    }

    pub fn event_batch_size(mut self, size: usize) -> Self {
        self.event_batch_size = size.max(1);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn analysis(&self) -> &ReviewAnalysis<A, P> {
        &self.analysis
    }

    /// Handle at most one page of pending events
    pub async fn run_once(&self) -> Result<WorkerPass> {
        let after = self.store.checkpoint(&self.consumer)?;
        let events = self.store.changes_since(after, self.event_batch_size)?;

        let Some(last) = events.last().map(|event| event.sequence) else {
            return Ok(WorkerPass {
                events: 0,
                checkpoint: after,
                report: AnalysisReport::default(),
            });
        };

        let report = self
            .analysis
            .handle(&events)
            .await
            .context(format!("Failed to analyze change events {}..={}", after + 1, last))?;

        self.store.save_checkpoint(&self.consumer, last)?;
        tracing::debug!(consumer = %self.consumer, checkpoint = last, "checkpoint saved");

        Ok(WorkerPass {
            events: events.len(),
            checkpoint: last,
            report,
        })
    }

    /// Run passes until the feed has nothing pending
    pub async fn drain(&self) -> Result<AnalysisReport> {
        let mut total = AnalysisReport::default();
        loop {
            let pass = self.run_once().await?;
            if pass.events == 0 {
                return Ok(total);
            }
            total.skipped += pass.report.skipped;
            total.batches += pass.report.batches;
            total.published += pass.report.published;
        }
    }

    /// Poll the feed until `shutdown` resolves.
    ///
    /// A failed pass is logged and retried after `poll_interval` from the
    /// same checkpoint.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);
        tracing::info!(
            consumer = %self.consumer,
            stream = %self.analysis.stream_name(),
            "analysis worker started"
        );

        loop {
            let pause = match self.run_once().await {
                Ok(pass) if pass.events > 0 => {
                    tracing::info!(
                        events = pass.events,
                        published = pass.report.published,
                        checkpoint = pass.checkpoint,
                        "change events processed"
                    );
                    Duration::ZERO
                }
                Ok(_) => self.poll_interval,
                Err(e) => {
                    tracing::warn!(
                        consumer = %self.consumer,
                        error = format!("{:#}", e),
                        "analysis pass failed, retrying"
                    );
                    self.poll_interval
                }
            };

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("analysis worker stopping");
                    return Ok(());
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }
}
