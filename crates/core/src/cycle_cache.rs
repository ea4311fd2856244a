use std::collections::HashMap;

use common::error::Error;
use common::rate::{BREAKEVEN, cycle_product, is_profitable, validate_rate};

/// Dense id of a pair label, assigned in first-seen order across the configured cycles.
pub type PairId = usize;

/// Id of a cycle, assigned in configuration order.
pub type CycleId = usize;

/// A pair's appearance in one cycle; `legs` counts how often the cycle trades the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Membership {
    cycle: CycleId,
    legs: u32,
}

/// One row of the trigger table: a quote for `pair` strictly above `threshold` makes `cycle`
/// profitable, all other rates unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerThreshold {
    pub pair: PairId,
    pub cycle: CycleId,
    pub threshold: f64,
}

/// Incremental profit cache over a fixed list of candidate arbitrage cycles.
///
/// Each cycle is an ordered list of pair labels whose rates multiply into the round-trip
/// return. Pairs and cycles are indexed both ways:
/// - `cycle_to_pairs[c]` → pairs of cycle `c` in multiplication order
/// - `pair_to_cycles[p]` → cycles containing pair `p`
///
/// `cycle_to_profit[c]` always equals the product of the current rates of `c`'s pairs, or
/// `None` while any of them is still unquoted. An update touches only the cycles that contain
/// the updated pair, and [`CycleProfitCache::new_arbitrage`] answers "would this quote open
/// an arbitrage" with one multiply per cycle.
#[derive(Debug, Clone)]
pub struct CycleProfitCache {
    pair_to_id: HashMap<String, PairId>,
    id_to_pair: Vec<String>,

    pair_to_cycles: Vec<Vec<Membership>>,
    cycle_to_pairs: Vec<Vec<PairId>>,

    pair_to_rate: Vec<Option<f64>>,
    cycle_to_profit: Vec<Option<f64>>,
}

impl CycleProfitCache {
    /// Builds the cache from cycles of pair labels. Every rate and profit starts undefined.
    ///
    /// A pair may appear several times in one cycle; each occurrence is one factor of the
    /// product.
    ///
    /// # Errors
    /// `Error::EmptyCycle` if a cycle has no pairs.
    pub fn new<C, P, S>(cycles: C) -> Result<Self, Error>
    where
        C: IntoIterator<Item = P>,
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pair_to_id: HashMap<String, PairId> = HashMap::new();
        let mut id_to_pair: Vec<String> = Vec::new();
        let mut pair_to_cycles: Vec<Vec<Membership>> = Vec::new();
        let mut cycle_to_pairs: Vec<Vec<PairId>> = Vec::new();

        for (cycle, labels) in cycles.into_iter().enumerate() {
            let mut pairs = Vec::new();

            for label in labels {
                let label = label.as_ref();
                let pair = match pair_to_id.get(label) {
                    Some(&pair) => pair,
                    None => {
                        let pair = id_to_pair.len();
                        pair_to_id.insert(label.to_string(), pair);
                        id_to_pair.push(label.to_string());
                        pair_to_cycles.push(Vec::new());
                        pair
                    }
                };

                // Cycles are processed one at a time, so a repeat within this cycle is
                // always the last membership recorded for the pair.
                match pair_to_cycles[pair].last_mut() {
                    Some(membership) if membership.cycle == cycle => membership.legs += 1,
                    _ => pair_to_cycles[pair].push(Membership { cycle, legs: 1 }),
                }
                pairs.push(pair);
            }

            if pairs.is_empty() {
                return Err(Error::EmptyCycle(cycle));
            }
            cycle_to_pairs.push(pairs);
        }

        let pair_to_rate = vec![None; id_to_pair.len()];
        let cycle_to_profit = vec![None; cycle_to_pairs.len()];

        Ok(Self {
            pair_to_id,
            id_to_pair,
            pair_to_cycles,
            cycle_to_pairs,
            pair_to_rate,
            cycle_to_profit,
        })
    }

    pub fn num_pairs(&self) -> usize {
        self.id_to_pair.len()
    }

    pub fn num_cycles(&self) -> usize {
        self.cycle_to_pairs.len()
    }

    pub fn contains_pair(&self, label: &str) -> bool {
        self.pair_to_id.contains_key(label)
    }

    pub fn pair_id(&self, label: &str) -> Result<PairId, Error> {
        self.pair_to_id
            .get(label)
            .copied()
            .ok_or_else(|| Error::UnknownPair(label.to_string()))
    }

    pub fn pair_label(&self, pair: PairId) -> Option<&str> {
        self.id_to_pair.get(pair).map(String::as_str)
    }

    /// Cycles containing `pair`, each listed once, in configuration order.
    pub fn pair_to_cycles(&self, pair: PairId) -> impl Iterator<Item = CycleId> + '_ {
        self.pair_to_cycles
            .get(pair)
            .into_iter()
            .flatten()
            .map(|membership| membership.cycle)
    }

    /// Pairs of `cycle` in multiplication order.
    pub fn cycle_to_pairs(&self, cycle: CycleId) -> Option<&[PairId]> {
        self.cycle_to_pairs.get(cycle).map(Vec::as_slice)
    }

    /// Pair labels of `cycle` in multiplication order.
    pub fn cycle_labels(&self, cycle: CycleId) -> Vec<&str> {
        self.cycle_to_pairs(cycle)
            .unwrap_or_default()
            .iter()
            .map(|&pair| self.id_to_pair[pair].as_str())
            .collect()
    }

    pub fn pair_to_rate(&self) -> &[Option<f64>] {
        &self.pair_to_rate
    }

    pub fn cycle_to_profit(&self) -> &[Option<f64>] {
        &self.cycle_to_profit
    }

    pub fn rate(&self, label: &str) -> Result<Option<f64>, Error> {
        Ok(self.pair_to_rate[self.pair_id(label)?])
    }

    pub fn profit(&self, cycle: CycleId) -> Option<f64> {
        self.cycle_to_profit.get(cycle).copied().flatten()
    }

    /// Cycles whose cached profit is currently above breakeven.
    pub fn profitable_cycles(&self) -> Vec<CycleId> {
        (0..self.num_cycles())
            .filter(|&cycle| is_profitable(self.cycle_to_profit[cycle]))
            .collect()
    }

    /// Sets the rate of `label` and recomputes the profit of every cycle containing it.
    ///
    /// Each affected profit is rebuilt from the live rates rather than patched, so the cache
    /// never drifts from the product of its inputs.
    ///
    /// # Errors
    /// `Error::UnknownPair` or `Error::InvalidRate`; nothing changes on error.
    pub fn update(&mut self, label: &str, rate: f64) -> Result<(), Error> {
        let pair = self.pair_id(label)?;
        let rate = validate_rate(rate)?;

        let Self {
            pair_to_cycles,
            cycle_to_pairs,
            pair_to_rate,
            cycle_to_profit,
            ..
        } = self;

        pair_to_rate[pair] = Some(rate);

        for membership in &pair_to_cycles[pair] {
            let cycle = membership.cycle;
            cycle_to_profit[cycle] =
                cycle_product(cycle_to_pairs[cycle].iter().map(|&p| pair_to_rate[p]));
        }

        Ok(())
    }

    /// Predicts whether quoting `label` at `rate` would leave any cycle containing it
    /// profitable, without changing any state.
    ///
    /// Only one factor of each product changes, so the new profit is
    /// `profit * (rate / current_rate)^legs`. Returns false while the pair has no current
    /// rate, and skips cycles whose profit is still undefined.
    ///
    /// # Errors
    /// `Error::UnknownPair` or `Error::InvalidRate`.
    pub fn new_arbitrage(&self, label: &str, rate: f64) -> Result<bool, Error> {
        let pair = self.pair_id(label)?;
        let rate = validate_rate(rate)?;

        let Some(current_rate) = self.pair_to_rate[pair] else {
            return Ok(false);
        };
        let ratio = rate / current_rate;

        Ok(self.pair_to_cycles[pair].iter().any(|membership| {
            self.cycle_to_profit[membership.cycle]
                .is_some_and(|profit| profit * ratio.powi(membership.legs as i32) > BREAKEVEN)
        }))
    }

    /// The trigger table: for every quoted pair and every cycle through it with a defined
    /// profit, the rate above which that cycle turns profitable.
    ///
    /// The table is a snapshot; it goes stale after the next [`Self::update`].
    pub fn trigger_table(&self) -> Vec<TriggerThreshold> {
        (0..self.num_pairs())
            .flat_map(|pair| self.thresholds(pair))
            .collect()
    }

    /// Trigger table rows for a single pair.
    pub fn thresholds_for_pair(&self, label: &str) -> Result<Vec<TriggerThreshold>, Error> {
        let pair = self.pair_id(label)?;
        Ok(self.thresholds(pair).collect())
    }

    fn thresholds(&self, pair: PairId) -> impl Iterator<Item = TriggerThreshold> + '_ {
        let rate = self.pair_to_rate[pair];

        self.pair_to_cycles[pair]
            .iter()
            .filter_map(move |membership| {
                let rate = rate?;
                let profit = self.cycle_to_profit[membership.cycle]?;
                // profit * (r / rate)^legs > 1  <=>  r > rate / profit^(1 / legs)
                let threshold = rate / profit.powf(1.0 / membership.legs as f64);

                Some(TriggerThreshold {
                    pair,
                    cycle: membership.cycle,
                    threshold,
                })
            })
    }
}
