use crate::analysis::DEFAULT_EVENT_BATCH_SIZE;
use crate::batcher::{BatchError, Batcher, DEFAULT_BATCH_SIZE};
use crate::nlp::MAX_BATCH_DOCUMENTS;
use crate::store::{validate_table_name, DEFAULT_TABLE_NAME};
use crate::stream::DEFAULT_STREAM_NAME;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = "reviews.db";
pub const DEFAULT_STREAM_DIR: &str = "streams";
pub const DEFAULT_NLP_ENDPOINT: &str = "http://localhost:18120";
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    BatchSize(#[from] BatchError<Infallible>),

    #[error("stream batch size {size} exceeds the NLP service limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("{0}")]
    Invalid(String),
}

/// Settings shared by every command
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub db_path: PathBuf,
    pub table_name: String,
    pub nlp_endpoint: String,
    pub nlp_timeout: Duration,
    pub stream_dir: PathBuf,
    pub stream_name: String,
    pub stream_shards: u32,
    /// Signed so that values like `-1` from the environment are reported,
    /// not wrapped
    pub stream_batch_size: i64,
    pub event_batch_size: usize,
    pub simulation_date: bool,
    pub server_addr: SocketAddr,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            nlp_endpoint: DEFAULT_NLP_ENDPOINT.to_string(),
            nlp_timeout: Duration::from_secs(30),
            stream_dir: PathBuf::from(DEFAULT_STREAM_DIR),
            stream_name: DEFAULT_STREAM_NAME.to_string(),
            stream_shards: 1,
            stream_batch_size: DEFAULT_BATCH_SIZE as i64,
            event_batch_size: DEFAULT_EVENT_BATCH_SIZE,
            simulation_date: false,
            server_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

impl PipelineConfig {
    /// Batcher for the analysis fan-out
    pub fn batcher(&self) -> Result<Batcher, ConfigError> {
        let batcher = Batcher::try_from_signed(self.stream_batch_size)?;
        if batcher.max_batch_size() > MAX_BATCH_DOCUMENTS {
            return Err(ConfigError::BatchTooLarge {
                size: batcher.max_batch_size(),
                max: MAX_BATCH_DOCUMENTS,
            });
        }
        Ok(batcher)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.batcher()?;
        validate_table_name(&self.table_name).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.event_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "event batch size must be at least 1".to_string(),
            ));
        }
        if self.stream_shards == 0 {
            return Err(ConfigError::Invalid(
                "stream shard count must be at least 1".to_string(),
            ));
        }
        if self.nlp_endpoint.is_empty() {
            return Err(ConfigError::Invalid("NLP endpoint must be set".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batcher().unwrap().max_batch_size(), 10);
        assert_eq!(config.server_addr.to_string(), DEFAULT_SERVER_ADDR);
    }

    #[test]
    fn test_non_positive_batch_size_rejected() {
        for size in [0, -3] {
            let config = PipelineConfig {
                stream_batch_size: size,
                ..PipelineConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::BatchSize(BatchError::Configuration { .. })
            ));
        }
    }

    #[test]
    fn test_batch_size_above_service_limit() {
        let config = PipelineConfig {
            stream_batch_size: 26,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.batcher(), Err(ConfigError::BatchTooLarge { size: 26, max: 25 })));
    }

    #[test]
    fn test_bad_table_name() {
        let config = PipelineConfig {
            table_name: "reviews; --".to_string(),
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
