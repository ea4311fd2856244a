use super::rate::{BREAKEVEN, rate_from_weight};

/// Represents a cycle in a weighted directed graph.
///
/// This struct stores both the sequence of edges forming the cycle
/// and metrics useful for analyzing the cycle.
///
/// Fields:
/// - `path`: The sequence of edges forming the cycle, in trading order.
/// - `rates`: Original exchange rates of the edges along the cycle.
/// - `log_rate_sum`: Sum of transformed weights (`-ln(rate)`); negative values indicate profit.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedCycle {
    pub path: Vec<Edge>,
    pub rates: Vec<f64>,
    pub log_rate_sum: f64,
}

impl WeightedCycle {
    /// Returns the actual profit multiplier (∏ rate_i) for the cycle.
    ///
    /// Internally, the cycle stores the transformed sum: ∑ w_i where w_i = -ln(rate_i).
    /// The product is recovered via the inverse operation: rate_product = e^(-sum(w_i)).
    ///
    /// Example:
    /// ```text
    /// If original rates are [2.0, 3.0, 4.0] (∏=24.0),
    /// stored sum (log_rate_sum) = -ln(24.0) ≈ -3.178.
    /// product_rate = exp(-(-3.178)) = 24.0
    /// ```
    pub fn product_rate(&self) -> f64 {
        rate_from_weight(self.log_rate_sum)
    }

    /// Returns true if the cycle is profitable (product_rate > 1.0).
    pub fn is_profitable(&self) -> bool {
        self.product_rate() > BREAKEVEN
    }

    /// Node ids visited by the cycle, starting at the source of the first edge.
    pub fn nodes(&self) -> Vec<usize> {
        self.path.iter().map(|&(from, _, _)| from).collect()
    }
}

/// Type alias for a single edge list: (from, to, rate)
pub type Edge = (usize, usize, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::log_weight;

    fn cycle_from_rates(path: Vec<Edge>) -> WeightedCycle {
        let rates: Vec<f64> = path.iter().map(|&(_, _, r)| r).collect();
        let log_rate_sum = rates.iter().map(|&r| log_weight(r)).sum();
        WeightedCycle {
            path,
            rates,
            log_rate_sum,
        }
    }

    #[test]
    fn product_rate_recovers_rate_product() {
        let cycle = cycle_from_rates(vec![(1, 2, 2.0), (2, 3, 3.0), (3, 1, 4.0)]);
        assert!((cycle.product_rate() - 24.0).abs() < 1e-9);
        assert!(cycle.is_profitable());
        assert_eq!(cycle.nodes(), vec![1, 2, 3]);
    }

    #[test]
    fn breakeven_cycle_is_not_profitable() {
        let cycle = cycle_from_rates(vec![(1, 2, 0.5), (2, 1, 2.0)]);
        assert!(!cycle.is_profitable());
    }
}
