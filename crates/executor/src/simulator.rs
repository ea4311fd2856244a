use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc::Sender;
use tokio::time::{self, Duration};
use tracing::{debug, info};

use super::config::SimulatorConfig;
use super::error::Error;
use super::types::{Quote, UpdateStreamer};

const BPS: f64 = 10_000.0;

/// Produces synthetic bid/ask quotes over a fixed set of currencies.
///
/// Each currency gets a fixed reference value at start-up. Every tick emits a batch of
/// quotes sharing one timestamp, each priced at the reference cross rate with a random
/// fluctuation and a fixed spread, so arbitrage loops open and close now and then.
pub struct SimulatorStreamer {
    currencies: Vec<String>,
    config: SimulatorConfig,
}

impl SimulatorStreamer {
    pub fn new(currencies: Vec<String>, config: SimulatorConfig) -> Self {
        SimulatorStreamer { currencies, config }
    }

    fn rng(&self) -> SmallRng {
        match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        }
    }

    /// Generates one tick worth of quotes.
    fn generate_batch(&self, rng: &mut SmallRng, values: &[f64], timestamp: u64) -> Vec<Quote> {
        let n = self.currencies.len();
        let fluctuation = self.config.rate_fluctuation_bps / BPS;
        let half_spread = self.config.spread_bps / BPS / 2.0;

        (0..self.config.batch_size)
            .map(|_| {
                let base = rng.random_range(0..n);
                // Pick a different currency for the quote side.
                let quote = (base + rng.random_range(1..n)) % n;

                let noise = if fluctuation > 0.0 {
                    rng.random_range(-fluctuation..=fluctuation)
                } else {
                    0.0
                };
                let mid = values[base] / values[quote] * (1.0 + noise);

                Quote {
                    base: self.currencies[base].clone(),
                    quote: self.currencies[quote].clone(),
                    ask: mid * (1.0 + half_spread),
                    bid: mid * (1.0 - half_spread),
                    timestamp,
                }
            })
            .collect()
    }
}

#[async_trait]
impl UpdateStreamer for SimulatorStreamer {
    /// Periodically sends batches of quotes until `ticks` is reached or the receiver is
    /// dropped. Backpressure comes from awaiting `sender.send()`.
    async fn run_stream(self, sender: Sender<Vec<Quote>>) -> Result<(), Error> {
        let mut interval = time::interval(Duration::from_millis(self.config.interval_ms));
        let mut rng = self.rng();

        // The first currency is the numeraire.
        let values: Vec<f64> = (0..self.currencies.len())
            .map(|i| if i == 0 { 1.0 } else { rng.random_range(0.5..2.0) })
            .collect();

        let mut timestamp = 0u64;
        loop {
            if self.config.ticks.is_some_and(|ticks| timestamp >= ticks) {
                info!("Simulator finished after {} ticks.", timestamp);
                return Ok(());
            }
            interval.tick().await;

            let quotes = self.generate_batch(&mut rng, &values, timestamp);
            debug!("Simulator sent {} quotes.", quotes.len());
            if sender.send(quotes).await.is_err() {
                info!("Simulator shutting down: searcher receiver dropped.");
                return Err(Error::ChannelSendFailed);
            }
            timestamp += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::{Duration, timeout};

    fn currencies() -> Vec<String> {
        ["USD", "EUR", "GBP"].iter().map(|c| c.to_string()).collect()
    }

    fn sim_config(batch_size: usize, ticks: Option<u64>) -> SimulatorConfig {
        SimulatorConfig {
            interval_ms: 1,
            batch_size,
            rate_fluctuation_bps: 5.0,
            spread_bps: 2.0,
            ticks,
            seed: Some(42),
        }
    }

    /// SimulatorStreamer generates the configured number of quotes per batch.
    #[tokio::test]
    async fn test_batch_size() {
        let sim = SimulatorStreamer::new(currencies(), sim_config(5, None));
        let (tx, mut rx) = mpsc::channel(10);

        tokio::spawn(async move {
            let _ = sim.run_stream(tx).await;
        });

        let quotes = timeout(Duration::from_millis(200), rx.recv())
            .await
            .expect("Did not receive batch")
            .expect("Channel closed");

        assert_eq!(quotes.len(), 5);
    }

    /// Quotes use configured currencies, never pair a currency with itself, and keep bid < ask.
    #[tokio::test]
    async fn test_quotes_are_well_formed() {
        let sim = SimulatorStreamer::new(currencies(), sim_config(50, Some(1)));
        let (tx, mut rx) = mpsc::channel(10);

        sim.run_stream(tx).await.expect("simulator should stop after one tick");

        let quotes = rx.recv().await.expect("one batch");
        let known = currencies();
        for quote in quotes {
            assert!(known.contains(&quote.base), "unknown base {}", quote.base);
            assert!(known.contains(&quote.quote), "unknown quote {}", quote.quote);
            assert_ne!(quote.base, quote.quote);
            assert!(quote.bid > 0.0 && quote.bid < quote.ask);
            assert_eq!(quote.timestamp, 0);
        }
        assert!(rx.recv().await.is_none());
    }

    /// Each tick gets its own timestamp and the stream ends after `ticks`.
    #[tokio::test]
    async fn test_ticks_advance_timestamps() {
        let sim = SimulatorStreamer::new(currencies(), sim_config(2, Some(3)));
        let (tx, mut rx) = mpsc::channel(10);

        sim.run_stream(tx).await.expect("simulator should finish");

        let mut timestamps = Vec::new();
        while let Some(batch) = rx.recv().await {
            assert!(batch.iter().all(|q| q.timestamp == batch[0].timestamp));
            timestamps.push(batch[0].timestamp);
        }
        assert_eq!(timestamps, vec![0, 1, 2]);
    }
}
