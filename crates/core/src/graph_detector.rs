use std::collections::HashMap;
use tracing::debug;

use super::matrix::WeightMatrix;
use super::solver::{BellmanFordSolver, Scratch};
use super::traits::GraphSolver;
use common::{error::Error, types::WeightedCycle};

/// A profitable cycle found by [`GraphArbitrageDetector::find_arbitrage_opportunity`].
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrageOpportunity {
    /// Currencies in trading order; the last one converts back into the first.
    pub currencies: Vec<String>,
    /// Round-trip return of one unit, `exp(-sum of weights)`.
    pub profit: f64,
    pub cycle: WeightedCycle,
}

/// Full-graph arbitrage detector over a fixed set of currencies.
///
/// Every quoted rate becomes a directed edge weighted `-ln(rate)`; an arbitrage loop anywhere
/// in the graph is then a negative cycle. Queries are meant to run once per quote snapshot
/// (timestamp), not once per quote.
#[derive(Debug, Clone)]
pub struct GraphArbitrageDetector<S: GraphSolver = BellmanFordSolver> {
    solver: S,
    graph: WeightMatrix,
    scratch: Scratch,
    currency_to_id: HashMap<String, usize>,
    id_to_currency: Vec<String>,
}

impl GraphArbitrageDetector<BellmanFordSolver> {
    /// Creates a detector tracking `currencies`, with no rates quoted yet.
    ///
    /// # Errors
    /// `Error::DuplicateCurrency` if a label appears twice.
    pub fn new<I, T>(currencies: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::with_solver(currencies, BellmanFordSolver)
    }
}

impl<S: GraphSolver> GraphArbitrageDetector<S> {
    pub fn with_solver<I, T>(currencies: I, solver: S) -> Result<Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        // Node 0 is the sentinel; its label is never looked up.
        let mut id_to_currency = vec![String::new()];
        let mut currency_to_id = HashMap::new();

        for currency in currencies {
            let currency = currency.into();
            if currency_to_id.contains_key(&currency) {
                return Err(Error::DuplicateCurrency(currency));
            }
            currency_to_id.insert(currency.clone(), id_to_currency.len());
            id_to_currency.push(currency);
        }

        let graph = WeightMatrix::new(id_to_currency.len() - 1);
        let scratch = Scratch::new(graph.num_nodes());

        Ok(Self {
            solver,
            graph,
            scratch,
            currency_to_id,
            id_to_currency,
        })
    }

    /// Tracked currency labels in id order.
    pub fn currencies(&self) -> &[String] {
        &self.id_to_currency[1..]
    }

    pub fn currency_id(&self, currency: &str) -> Result<usize, Error> {
        self.currency_to_id
            .get(currency)
            .copied()
            .ok_or_else(|| Error::UnknownCurrency(currency.to_string()))
    }

    pub fn currency_label(&self, id: usize) -> Option<&str> {
        match id {
            WeightMatrix::SENTINEL => None,
            _ => self.id_to_currency.get(id).map(String::as_str),
        }
    }

    pub fn graph(&self) -> &WeightMatrix {
        &self.graph
    }

    /// Current rate for converting `from` into `to`, if quoted.
    pub fn rate(&self, from: &str, to: &str) -> Result<Option<f64>, Error> {
        let (from, to) = (self.currency_id(from)?, self.currency_id(to)?);
        Ok(self.graph.rate(from, to))
    }

    /// Sets the rate for converting one unit of `from` into `to`.
    ///
    /// Only the `from -> to` direction changes; bid and ask differ, so callers quote each
    /// direction separately.
    ///
    /// # Errors
    /// `Error::UnknownCurrency` or `Error::InvalidRate`; the graph is unchanged on error.
    pub fn update(&mut self, from: &str, to: &str, rate: f64) -> Result<(), Error> {
        let (from, to) = (self.currency_id(from)?, self.currency_id(to)?);
        self.graph.set_rate(from, to, rate)
    }

    /// Withdraws the `from -> to` quote so the edge no longer takes part in detection.
    pub fn remove_rate(&mut self, from: &str, to: &str) -> Result<(), Error> {
        let (from, to) = (self.currency_id(from)?, self.currency_id(to)?);
        self.graph.clear_edge(from, to)
    }

    /// Returns true if some cycle of quoted rates multiplies to more than 1.0.
    pub fn is_arbitrage_possible(&mut self) -> bool {
        self.solver.has_negative_cycle(&self.graph, &mut self.scratch)
    }

    /// Like [`Self::is_arbitrage_possible`], but also reports the currencies and profit of the
    /// first cycle the search runs into. This is not necessarily the most profitable cycle.
    pub fn find_arbitrage_opportunity(&mut self) -> Result<Option<ArbitrageOpportunity>, Error> {
        let Some(cycle) = self
            .solver
            .find_negative_cycle(&self.graph, &mut self.scratch)?
        else {
            return Ok(None);
        };

        let currencies = cycle
            .nodes()
            .into_iter()
            .map(|id| {
                self.currency_label(id)
                    .map(str::to_string)
                    .ok_or(Error::CycleReconstructionFailed)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let profit = cycle.product_rate();
        debug!(?currencies, profit, "negative cycle reconstructed");

        Ok(Some(ArbitrageOpportunity {
            currencies,
            profit,
            cycle,
        }))
    }
}
