use anyhow::{Context, Result};
use clap::Parser;
use review_pipeline::cli::{Cli, Command};
use review_pipeline::{
    simulate, AnalysisWorker, DateMode, JsonlStream, NlpClient, PipelineConfig, ReviewAnalysis,
    ReviewBackend, ReviewStore, Simulator,
};
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = review_pipeline::logging::init() {
        eprintln!("warning: logging not initialized: {}", e);
    }

    let cli = Cli::parse();
    let config = cli.config();
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Command::Serve { .. } => serve(&config).await,
        Command::Analyze {
            once,
            consumer,
            poll_ms,
        } => analyze(&config, once, consumer, Duration::from_millis(poll_ms)).await,
        Command::Simulate {
            url,
            token,
            input,
            csv_product,
            count,
            target_product,
            rounds,
            pause_secs,
        } => {
            let reviews = match &csv_product {
                Some(product) => simulate::load_csv(&input, product),
                None => simulate::load_lines(&input, count),
            }
            .context(format!("Failed to load reviews from {}", input.display()))?;

            tracing::info!(reviews = reviews.len(), rounds, "starting replay");
            let started = Instant::now();
            let report = Simulator::new(url, token)
                .product_id(target_product)
                .replay(&reviews, rounds, Duration::from_secs(pause_secs))
                .await;

            tracing::info!(
                sent = report.sent,
                failed = report.failed,
                elapsed_secs = started.elapsed().as_secs_f64(),
                "replay finished"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Query { product_id } => {
            let store = open_store(&config)?;
            let reviews = store.query_product(&product_id)?;
            println!("{}", serde_json::to_string_pretty(&reviews)?);
            Ok(())
        }
        Command::Records { shard } => {
            let stream = JsonlStream::open(&config.stream_dir, config.stream_shards)?;
            let records = match shard {
                Some(shard) => stream.read_shard(&config.stream_name, shard)?,
                None => stream.read_all(&config.stream_name)?,
            };

            let mut out = std::io::stdout().lock();
            for record in records {
                writeln!(out, "{}", serde_json::to_string(&record)?)?;
            }
            Ok(())
        }
    }
}

fn open_store(config: &PipelineConfig) -> Result<Arc<ReviewStore>> {
    let path = config.db_path.to_string_lossy();
    let store = ReviewStore::open(&path, &config.table_name)?;
    tracing::info!(db = %path, table = %config.table_name, "review table opened");
    Ok(Arc::new(store))
}

fn nlp_client(config: &PipelineConfig) -> Result<NlpClient> {
    NlpClient::with_timeout(&config.nlp_endpoint, config.nlp_timeout)
        .context("Failed to build NLP client")
}

async fn serve(config: &PipelineConfig) -> Result<()> {
    let store = open_store(config)?;
    let backend = ReviewBackend::new(nlp_client(config)?, store)
        .date_mode(DateMode::from_flag(config.simulation_date));

    review_pipeline::server::serve(Arc::new(backend), config.server_addr, shutdown_signal()).await
}

async fn analyze(
    config: &PipelineConfig,
    once: bool,
    consumer: String,
    poll_interval: Duration,
) -> Result<()> {
    let store = open_store(config)?;
    let stream = JsonlStream::open(&config.stream_dir, config.stream_shards)
        .context(format!("Failed to open stream under {}", config.stream_dir.display()))?;
    let analysis = ReviewAnalysis::new(
        nlp_client(config)?,
        stream,
        config.batcher()?,
        config.stream_name.clone(),
    );

    let worker = AnalysisWorker::new(analysis, store)
        .consumer(consumer)
        .event_batch_size(config.event_batch_size)
        .poll_interval(poll_interval);

    if once {
        let report = worker.drain().await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    worker.run(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
