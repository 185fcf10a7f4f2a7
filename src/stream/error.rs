use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("stream I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode stream record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid stream name: {0}")]
    InvalidStreamName(String),

    #[error("shard count must be at least 1")]
    NoShards,

    #[error("stream state lock poisoned")]
    LockPoisoned,

    #[error("stream append task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
