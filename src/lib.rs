// Public API exports
pub mod analysis;
pub mod backend;
pub mod batcher;
pub mod cli;
pub mod config;
pub mod logging;
pub mod nlp;
pub mod review;
pub mod server;
pub mod simulate;
pub mod store;
pub mod stream;

// Re-export main types for convenience
pub use batcher::{BatchError, BatchReport, Batcher, DEFAULT_BATCH_SIZE};

pub use review::{
    DateMode, EnrichedReview, ReviewItem, ReviewRequest, Sentiment, SentimentLabel, ValidReview,
};

pub use nlp::{NlpClient, NlpError, SentimentAnalyzer, TextAnalyzer};

pub use store::{ChangeEvent, EventName, ReviewStore, ReviewTable};

pub use stream::{JsonlStream, StreamError, StreamPublisher, StreamRecord};

pub use backend::{ApiResponse, BackendError, ReviewBackend};

pub use analysis::{AnalysisError, AnalysisReport, AnalysisWorker, ReviewAnalysis};

pub use config::{ConfigError, PipelineConfig};

pub use simulate::{SimulationReport, Simulator};
