//! coalesce-demo - drive a batcher from the command line
//!
//! Enqueues a list of keys against a simulated bulk backend and prints every
//! key's outcome plus the batcher's statistics as JSON. The key `error`
//! fails on its own; the key `throw` fails its whole batch.

#![allow(missing_docs)]

use anyhow::Context;
use clap::Parser;
use coalesce_rs::{
    BatchOutcomes, Batcher, BatcherConfig, LogFormat, LoggingConfig, executor_fn, init_logging,
};
use futures::future::join_all;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "coalesce-demo", version, about = "Batch keys through a simulated backend")]
struct Args {
    /// Comma-separated keys enqueued in each burst
    #[arg(long, value_delimiter = ',', default_value = "a,b,a,c")]
    keys: Vec<String>,

    /// Maximum unique keys per batch
    #[arg(long, env = "COALESCE_MAX_BATCH_SIZE")]
    max_batch_size: Option<usize>,

    /// Delay window in milliseconds
    #[arg(long, env = "COALESCE_DELAY_WINDOW_MS")]
    delay_window_ms: Option<u64>,

    /// Number of bursts
    #[arg(long, default_value_t = 1)]
    bursts: usize,

    /// Pause between bursts in milliseconds
    #[arg(long, default_value_t = 0)]
    burst_gap_ms: u64,

    /// Simulated backend latency in milliseconds
    #[arg(long, default_value_t = 5)]
    latency_ms: u64,

    /// YAML or JSON file with batcher options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct BackendError(String);

async fn load_config(args: &Args) -> anyhow::Result<BatcherConfig> {
    let mut config = match &args.config {
        Some(path) => BatcherConfig::from_file(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => BatcherConfig::default(),
    };

    if let Some(max_batch_size) = args.max_batch_size {
        config.max_batch_size = max_batch_size;
    }
    if let Some(delay_window_ms) = args.delay_window_ms {
        config.delay_window_ms = delay_window_ms;
    }
    Ok(config)
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args).await?;
    info!(?config, "Starting demo");

    let latency = Duration::from_millis(args.latency_ms);
    let executor = executor_fn(move |keys: Vec<String>| async move {
        tokio::time::sleep(latency).await;
        info!(?keys, "Backend called");

        let mut outcomes = Vec::with_capacity(keys.len());
        for (index, key) in keys.iter().enumerate() {
            match key.as_str() {
                "throw" => return Err(BackendError(format!("backend rejected batch at {}", index))),
                "error" => outcomes.push(Err(BackendError(format!("no value for key {}", index)))),
                _ => outcomes.push(Ok(format!("{}-index-{}", key, index))),
            }
        }
        let outcomes: BatchOutcomes<String, BackendError> = Ok(outcomes);
        outcomes
    });

    let batcher = Batcher::try_with_config(executor, config)?;

    let mut results = Vec::new();
    for burst in 0..args.bursts {
        if burst > 0 && args.burst_gap_ms > 0 {
            tokio::time::sleep(Duration::from_millis(args.burst_gap_ms)).await;
        }

        let pending: Vec<_> = args
            .keys
            .iter()
            .map(|key| (key.clone(), batcher.enqueue(key.clone())))
            .collect();

        let (keys, futures): (Vec<_>, Vec<_>) = pending.into_iter().unzip();
        for (key, outcome) in keys.into_iter().zip(join_all(futures).await) {
            results.push(match outcome {
                Ok(value) => json!({ "burst": burst, "key": key, "value": value }),
                Err(err) => json!({ "burst": burst, "key": key, "error": err.to_string() }),
            });
        }
    }

    let report = json!({ "results": results, "stats": batcher.stats() });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let logging = LoggingConfig {
        format: if args.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        ..Default::default()
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
