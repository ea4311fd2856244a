use common::error::Error;
use common::rate::{log_weight, rate_from_weight, validate_rate};

/// Dense weighted adjacency matrix over the tracked currencies plus one sentinel node.
///
/// Weights live in a single flat buffer indexed by `row * num_nodes + col`:
/// - `weights[i * n + j] == Some(-ln(rate))` → edge `i -> j` is quoted
/// - `weights[i * n + j] == None` → no edge
///
/// Node `0` is the sentinel. Its row holds a zero-weight edge to every real node and never
/// changes afterwards, so a single Bellman-Ford source reaches every component.
/// Real currencies occupy nodes `1..num_nodes`.
#[derive(Debug, Clone)]
pub struct WeightMatrix {
    num_nodes: usize,
    weights: Vec<Option<f64>>,
}

impl WeightMatrix {
    pub const SENTINEL: usize = 0;

    /// Creates a matrix for `num_currencies` real nodes with no quoted edges.
    pub fn new(num_currencies: usize) -> Self {
        let num_nodes = num_currencies + 1;
        let mut weights = vec![None; num_nodes * num_nodes];

        for col in 1..num_nodes {
            weights[Self::SENTINEL * num_nodes + col] = Some(0.0);
        }

        Self { num_nodes, weights }
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of real (non-sentinel) nodes.
    pub fn num_currencies(&self) -> usize {
        self.num_nodes - 1
    }

    /// Returns the weight of `from -> to`, or `None` if the edge is absent or out of range.
    pub fn weight(&self, from: usize, to: usize) -> Option<f64> {
        if from >= self.num_nodes || to >= self.num_nodes {
            return None;
        }
        self.weights[from * self.num_nodes + to]
    }

    /// Returns the exchange rate behind `from -> to`, if quoted.
    pub fn rate(&self, from: usize, to: usize) -> Option<f64> {
        self.weight(from, to).map(rate_from_weight)
    }

    /// Sets the directed edge `from -> to` to `-ln(rate)`.
    ///
    /// The reverse edge is left alone. The sentinel row cannot be overwritten.
    ///
    /// # Errors
    /// `Error::NodeIndexOutOfBounds` for the sentinel or an index `>= num_nodes`,
    /// `Error::InvalidRate` for a non-finite or non-positive rate.
    pub fn set_rate(&mut self, from: usize, to: usize, rate: f64) -> Result<(), Error> {
        let idx = self.real_edge_index(from, to)?;
        let rate = validate_rate(rate)?;
        self.weights[idx] = Some(log_weight(rate));
        Ok(())
    }

    /// Marks `from -> to` as absent again.
    pub fn clear_edge(&mut self, from: usize, to: usize) -> Result<(), Error> {
        let idx = self.real_edge_index(from, to)?;
        self.weights[idx] = None;
        Ok(())
    }

    /// Iterates over every present edge `(from, to, weight)` in row-major order.
    ///
    /// Self loops are skipped: they cannot form a multi-currency cycle and are never relaxed.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.num_nodes;
        self.weights
            .iter()
            .enumerate()
            .filter_map(move |(idx, weight)| {
                let (from, to) = (idx / n, idx % n);
                match weight {
                    Some(w) if from != to => Some((from, to, *w)),
                    _ => None,
                }
            })
    }

    fn real_edge_index(&self, from: usize, to: usize) -> Result<usize, Error> {
        for node in [from, to] {
            if node == Self::SENTINEL || node >= self.num_nodes {
                return Err(Error::NodeIndexOutOfBounds(node));
            }
        }
        Ok(from * self.num_nodes + to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_matrix_only_has_sentinel_edges() {
        let matrix = WeightMatrix::new(3);

        assert_eq!(matrix.num_nodes(), 4);
        assert_eq!(matrix.num_currencies(), 3);
        let edges: Vec<_> = matrix.edges().collect();
        assert_eq!(edges, vec![(0, 1, 0.0), (0, 2, 0.0), (0, 3, 0.0)]);
    }

    #[test]
    fn empty_matrix_has_only_the_sentinel() {
        let matrix = WeightMatrix::new(0);

        assert_eq!(matrix.num_nodes(), 1);
        assert_eq!(matrix.edges().count(), 0);
    }

    #[test]
    fn set_rate_stores_negative_log_in_one_direction() {
        let mut matrix = WeightMatrix::new(2);
        matrix.set_rate(1, 2, 0.5).unwrap();

        assert_eq!(matrix.weight(1, 2), Some(-0.5f64.ln()));
        assert_eq!(matrix.weight(2, 1), None);
        assert!((matrix.rate(1, 2).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn set_rate_overwrites_previous_quote() {
        let mut matrix = WeightMatrix::new(2);
        matrix.set_rate(1, 2, 0.5).unwrap();
        matrix.set_rate(1, 2, 2.0).unwrap();

        assert_eq!(matrix.weight(1, 2), Some(-2.0f64.ln()));
    }

    #[test]
    fn sentinel_and_out_of_range_nodes_are_rejected() {
        let mut matrix = WeightMatrix::new(2);

        assert_eq!(
            matrix.set_rate(0, 1, 1.0),
            Err(Error::NodeIndexOutOfBounds(0))
        );
        assert_eq!(
            matrix.set_rate(1, 3, 1.0),
            Err(Error::NodeIndexOutOfBounds(3))
        );
        assert_eq!(matrix.weight(0, 1), Some(0.0));
        assert_eq!(matrix.weight(7, 1), None);
    }

    #[test]
    fn invalid_rate_leaves_edge_untouched() {
        let mut matrix = WeightMatrix::new(2);
        matrix.set_rate(1, 2, 1.5).unwrap();

        assert_eq!(matrix.set_rate(1, 2, 0.0), Err(Error::InvalidRate(0.0)));
        assert_eq!(matrix.weight(1, 2), Some(-1.5f64.ln()));
    }

    #[test]
    fn clear_edge_makes_edge_absent() {
        let mut matrix = WeightMatrix::new(2);
        matrix.set_rate(2, 1, 1.1).unwrap();
        matrix.clear_edge(2, 1).unwrap();

        assert_eq!(matrix.weight(2, 1), None);
        assert_eq!(matrix.edges().count(), 2);
    }

    #[test]
    fn self_loops_are_stored_but_not_iterated() {
        let mut matrix = WeightMatrix::new(2);
        matrix.set_rate(1, 1, 2.0).unwrap();

        assert!(matrix.weight(1, 1).is_some());
        assert!(matrix.edges().all(|(from, to, _)| from != to));
    }
}
