use tokio::select;
use tokio::sync::{mpsc::Receiver, watch};
use tracing::{debug, info, warn};

use super::config::DetectorConfig;
use super::error::Error;
use super::types::Quote;
use common::error::Error as DetectorError;
use forex_arb_core::{ArbitrageOpportunity, CycleId, CycleProfitCache, GraphArbitrageDetector};

/// Something worth acting on.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    /// The full graph holds a profitable loop once every quote of `timestamp` is applied.
    Graph {
        timestamp: u64,
        opportunity: ArbitrageOpportunity,
    },
    /// Quoting `pair` at `rate` turns the listed tracked cycles profitable.
    Cycle {
        timestamp: u64,
        pair: String,
        rate: f64,
        cycles: Vec<CycleId>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub quotes_applied: u64,
    pub quotes_skipped: u64,
    pub snapshots_checked: u64,
    pub graph_opportunities: u64,
    pub cycle_alerts: u64,
}

/// Single writer over both detectors.
///
/// Quotes are applied strictly in arrival order. The full-graph search runs once per
/// completed timestamp, right before the first quote of the next timestamp is applied, so
/// each query sees one consistent snapshot.
pub struct ArbSearcher {
    graph: GraphArbitrageDetector,
    cache: CycleProfitCache,
    last_timestamp: Option<u64>,
    stop_on_first: bool,
    stats: SearchStats,
}

impl ArbSearcher {
    pub fn new(config: &DetectorConfig) -> Result<Self, Error> {
        let graph = GraphArbitrageDetector::new(config.currencies.iter().cloned())?;
        let cache = CycleProfitCache::new(&config.cycles)?;

        info!(
            currencies = graph.currencies().len(),
            pairs = cache.num_pairs(),
            cycles = cache.num_cycles(),
            "Searcher configured."
        );

        Ok(ArbSearcher {
            graph,
            cache,
            last_timestamp: None,
            stop_on_first: config.stop_on_first,
            stats: SearchStats::default(),
        })
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn cache(&self) -> &CycleProfitCache {
        &self.cache
    }

    /// Applies one quote, first closing the previous snapshot if the timestamp moved on.
    pub fn process_quote(&mut self, quote: &Quote) -> Result<Vec<Finding>, Error> {
        let mut findings = Vec::new();

        if let Some(previous) = self.last_timestamp {
            if previous != quote.timestamp {
                findings.extend(self.check_snapshot(previous)?);
            }
        }
        self.last_timestamp = Some(quote.timestamp);

        match self.apply_to_graph(quote) {
            Ok(()) => self.stats.quotes_applied += 1,
            Err(DetectorError::UnknownCurrency(currency)) => {
                debug!(%currency, pair = %quote.pair_label(), "Skipping quote for untracked currency.");
                self.stats.quotes_skipped += 1;
                return Ok(findings);
            }
            Err(e) => {
                warn!(pair = %quote.pair_label(), "Rejected quote: {}", e);
                self.stats.quotes_skipped += 1;
                return Ok(findings);
            }
        }

        for (pair, rate) in [
            (quote.pair_label(), quote.sell_rate()),
            (quote.inverse_label(), quote.buy_rate()),
        ] {
            if let Some(finding) = self.apply_to_cache(pair, rate, quote.timestamp)? {
                findings.push(finding);
            }
        }

        Ok(findings)
    }

    /// Checks the last open snapshot. Call once the stream has ended.
    pub fn finish(&mut self) -> Result<Option<Finding>, Error> {
        match self.last_timestamp {
            Some(timestamp) => self.check_snapshot(timestamp),
            None => Ok(None),
        }
    }

    fn apply_to_graph(&mut self, quote: &Quote) -> Result<(), DetectorError> {
        // Validate both sides first so a half-applied quote never reaches the graph.
        self.graph.currency_id(&quote.base)?;
        self.graph.currency_id(&quote.quote)?;
        common::rate::validate_rate(quote.sell_rate())?;
        common::rate::validate_rate(quote.buy_rate())?;

        self.graph
            .update(&quote.base, &quote.quote, quote.sell_rate())?;
        self.graph
            .update(&quote.quote, &quote.base, quote.buy_rate())
    }

    /// Predicts before committing, so an opening cycle is flagged on the quote that opens it.
    fn apply_to_cache(
        &mut self,
        pair: String,
        rate: f64,
        timestamp: u64,
    ) -> Result<Option<Finding>, Error> {
        if !self.cache.contains_pair(&pair) {
            return Ok(None);
        }

        let opens = self.cache.new_arbitrage(&pair, rate)?;
        self.cache.update(&pair, rate)?;

        if !opens {
            return Ok(None);
        }

        let pair_id = self.cache.pair_id(&pair)?;
        let cycles: Vec<CycleId> = self
            .cache
            .pair_to_cycles(pair_id)
            .filter(|&cycle| common::rate::is_profitable(self.cache.profit(cycle)))
            .collect();

        for &cycle in &cycles {
            info!(
                timestamp,
                %pair,
                rate,
                cycle = ?self.cache.cycle_labels(cycle),
                profit = self.cache.profit(cycle).unwrap_or_default(),
                "Tracked cycle is profitable."
            );
        }
        self.stats.cycle_alerts += 1;

        Ok(Some(Finding::Cycle {
            timestamp,
            pair,
            rate,
            cycles,
        }))
    }

    fn check_snapshot(&mut self, timestamp: u64) -> Result<Option<Finding>, Error> {
        self.stats.snapshots_checked += 1;

        let Some(opportunity) = self.graph.find_arbitrage_opportunity()? else {
            return Ok(None);
        };

        info!(
            timestamp,
            profit = opportunity.profit,
            path = %opportunity.currencies.join(" -> "),
            "Arbitrage FOUND."
        );
        self.stats.graph_opportunities += 1;

        Ok(Some(Finding::Graph {
            timestamp,
            opportunity,
        }))
    }

    /// Consumes quote batches until the producer is done, shutdown is signalled, or the
    /// first graph opportunity is found with `stop_on_first` set.
    pub async fn run(
        mut self,
        mut receiver: Receiver<Vec<Quote>>,
        mut shutdown: watch::Receiver<()>,
    ) -> Result<SearchStats, Error> {
        info!("Searcher ready.");

        loop {
            select! {
                batch = receiver.recv() => {
                    let Some(batch) = batch else {
                        info!("Receiver closed, running final snapshot check.");
                        self.finish()?;
                        break;
                    };

                    for quote in &batch {
                        let findings = self.process_quote(quote)?;
                        if self.stop_on_first
                            && findings.iter().any(|f| matches!(f, Finding::Graph { .. }))
                        {
                            info!("Stopping on first opportunity.");
                            return Ok(self.stats);
                        }
                    }
                }

                _ = shutdown.changed() => {
                    info!("Shutdown signal received, stopping searcher.");
                    break;
                }
            }
        }

        Ok(self.stats)
    }
}
