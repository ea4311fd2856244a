pub mod config;
pub mod csv_streamer;
pub mod error;
pub mod logging;
pub mod producer;
pub mod searcher;
pub mod simulator;
pub mod types;

use std::env;
use tokio::sync::{mpsc, mpsc::Sender, watch};
use tracing::{error, info};

use csv_streamer::CsvStreamer;
use error::Error;
use producer::Producer;
use searcher::ArbSearcher;
use simulator::SimulatorStreamer;
use types::{DataSource, JoinHandleResult, Quote};

#[tokio::main]
async fn main() {
    let source = parse_args();
    let config = config::load_config().expect("Failed to load config");
    logging::init(&config.logging);

    let searcher = ArbSearcher::new(&config.detector).expect("Invalid detector configuration");

    let (sender, receiver) = mpsc::channel::<Vec<Quote>>(config.executor.buffer_size);
    let (shutdown_tx, shutdown_rx) = watch::channel(());

    // Spawn tasks
    let producer_handle = spawn_producer(&source, sender, &config);
    let searcher_handle = tokio::spawn(searcher.run(receiver, shutdown_rx));

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    let (producer_result, searcher_result) = tokio::join!(producer_handle, searcher_handle);

    match producer_result {
        Ok(Ok(())) => info!("Producer finished."),
        Ok(Err(Error::ChannelSendFailed)) => info!("Producer stopped: searcher is done."),
        Ok(Err(e)) => error!("Producer failed: {}", e),
        Err(e) => error!("Producer task panicked: {}", e),
    }

    match searcher_result {
        Ok(Ok(stats)) => info!(?stats, "Searcher finished."),
        Ok(Err(e)) => error!("Searcher failed: {}", e),
        Err(e) => error!("Searcher task panicked: {}", e),
    }

    info!("Pipeline shut down.");
}

/// Parse command-line arguments to determine data source
fn parse_args() -> DataSource {
    let args: Vec<String> = env::args().collect();
    let source = args
        .get(1)
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "sim".to_string());

    match source.as_str() {
        "sim" => DataSource::Sim,
        "csv" => {
            let path = args.get(2).expect("CSV path required for CSV mode").clone();
            DataSource::Csv(path)
        }
        _ => {
            eprintln!(
                "Usage: {} <SIM|CSV> [path_to_csv]\n  - SIM: run simulated quote stream\n  - CSV: read Polygon.io forex quotes from a CSV file",
                args[0]
            );
            std::process::exit(1);
        }
    }
}

pub fn spawn_producer(
    source: &DataSource,
    sender: Sender<Vec<Quote>>,
    config: &config::Config,
) -> JoinHandleResult {
    match source {
        DataSource::Sim => {
            info!("Starting SimulatorStreamer producer task...");
            let streamer = SimulatorStreamer::new(
                config.detector.currencies.clone(),
                config.simulator.clone(),
            );
            Producer::new(streamer).spawn(sender)
        }
        DataSource::Csv(path) => {
            info!("Starting CsvStreamer producer task...");
            let streamer = CsvStreamer::new(path.clone(), config.producer.batch_size);
            Producer::new(streamer).spawn(sender)
        }
    }
}
