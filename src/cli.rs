use crate::analysis::DEFAULT_CONSUMER;
use crate::config::{
    PipelineConfig, DEFAULT_DB_PATH, DEFAULT_NLP_ENDPOINT, DEFAULT_SERVER_ADDR, DEFAULT_STREAM_DIR,
};
use crate::simulate::DEFAULT_TARGET_PRODUCT;
use crate::store::DEFAULT_TABLE_NAME;
use crate::stream::DEFAULT_STREAM_NAME;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "review-pipeline", version, about = "Review intake and enrichment pipeline")]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings every command reads, each with an environment fallback
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// SQLite file holding the review table
    #[arg(long, env = "REVIEW_DB_PATH", default_value = DEFAULT_DB_PATH, global = true)]
    pub db_path: PathBuf,

    #[arg(long, env = "TABLE_NAME", default_value = DEFAULT_TABLE_NAME, global = true)]
    pub table_name: String,

    /// Base URL of the NLP service
    #[arg(long, env = "NLP_ENDPOINT", default_value = DEFAULT_NLP_ENDPOINT, global = true)]
    pub nlp_endpoint: String,

    #[arg(long, env = "NLP_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub nlp_timeout_secs: u64,

    /// Directory the enriched-review stream is written under
    #[arg(long, env = "STREAM_DIR", default_value = DEFAULT_STREAM_DIR, global = true)]
    pub stream_dir: PathBuf,

    #[arg(long, env = "STREAM_NAME", default_value = DEFAULT_STREAM_NAME, global = true)]
    pub stream_name: String,

    #[arg(long, env = "STREAM_SHARDS", default_value_t = 1, global = true)]
    pub stream_shards: u32,

    /// Reviews per entity/syntax call and per publish
    #[arg(
        long,
        env = "STREAM_BATCH_SIZE",
        default_value_t = 10,
        allow_negative_numbers = true,
        global = true
    )]
    pub stream_batch_size: i64,

    /// Change events read from the table feed per pass
    #[arg(long, env = "EVENT_BATCH_SIZE", default_value_t = 100, global = true)]
    pub event_batch_size: usize,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Accept reviews over HTTP and store them with their sentiment
    Serve {
        #[arg(long, env = "SERVER_ADDR", default_value = DEFAULT_SERVER_ADDR)]
        addr: SocketAddr,

        /// Spread review dates over +/- 15 days (for replayed traffic)
        #[arg(long, env = "SIMULATION_DATE")]
        simulation_date: bool,
    },

    /// Enrich newly inserted reviews and publish them to the stream
    Analyze {
        /// Drain pending change events and exit
        #[arg(long)]
        once: bool,

        /// Checkpoint name in the change feed
        #[arg(long, default_value = DEFAULT_CONSUMER)]
        consumer: String,

        #[arg(long, default_value_t = 1000)]
        poll_ms: u64,
    },

    /// Replay review text against a running endpoint
    Simulate {
        /// Full URL of the review endpoint, e.g. http://localhost:8080/review
        #[arg(long, env = "REVIEW_URL")]
        url: String,

        /// Bearer token sent with every request
        #[arg(long, env = "REVIEW_TOKEN")]
        token: String,

        /// Plain text (one review per line) or, with --csv-product, a CSV export
        #[arg(long)]
        input: PathBuf,

        /// Read `input` as CSV and keep rows of this product
        #[arg(long)]
        csv_product: Option<String>,

        /// Maximum number of reviews to read from a text input
        #[arg(long)]
        count: Option<usize>,

        /// Product id the reviews are submitted under
        #[arg(long, default_value = DEFAULT_TARGET_PRODUCT)]
        target_product: String,

        #[arg(long, default_value_t = 1)]
        rounds: usize,

        /// Pause between rounds, in seconds
        #[arg(long, default_value_t = 10)]
        pause_secs: u64,
    },

    /// Print the stored reviews of a product as JSON
    Query { product_id: String },

    /// Print the records published to the stream as JSON lines
    Records {
        #[arg(long)]
        shard: Option<u32>,
    },
}

impl Cli {
    /// Resolve the shared settings plus whatever the chosen command adds
    pub fn config(&self) -> PipelineConfig {
        let common = &self.common;
        let mut config = PipelineConfig {
            db_path: common.db_path.clone(),
            table_name: common.table_name.clone(),
            nlp_endpoint: common.nlp_endpoint.clone(),
            nlp_timeout: Duration::from_secs(common.nlp_timeout_secs),
            stream_dir: common.stream_dir.clone(),
            stream_name: common.stream_name.clone(),
            stream_shards: common.stream_shards,
            stream_batch_size: common.stream_batch_size,
            event_batch_size: common.event_batch_size,
            ..PipelineConfig::default()
        };

        if let Command::Serve {
            addr,
            simulation_date,
        } = &self.command
        {
            config.server_addr = *addr;
            config.simulation_date = *simulation_date;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_args() {
        let cli = Cli::try_parse_from([
            "review-pipeline",
            "serve",
            "--addr",
            "127.0.0.1:9000",
            "--simulation-date",
            "--table-name",
            "ReviewServiceDev-ReviewHistoryTable",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(config.server_addr.port(), 9000);
        assert!(config.simulation_date);
        assert_eq!(config.table_name, "ReviewServiceDev-ReviewHistoryTable");
        assert_eq!(config.stream_batch_size, 10);
    }

    #[test]
    fn test_negative_batch_size_parses_then_fails_validation() {
        let cli = Cli::try_parse_from([
            "review-pipeline",
            "analyze",
            "--once",
            "--stream-batch-size",
            "-1",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Analyze { once: true, .. }));
        assert!(cli.config().validate().is_err());
    }
}
