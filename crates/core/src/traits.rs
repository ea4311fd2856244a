use super::matrix::WeightMatrix;
use super::solver::Scratch;
use common::{error::Error, types::WeightedCycle};

/// Trait for graph solvers capable of detecting negative cycles.
///
/// Searches always start from [`WeightMatrix::SENTINEL`], which reaches every node.
/// `scratch` is working memory owned by the caller and is fully re-initialised on each call.
pub trait GraphSolver {
    /// Returns true if a negative cycle exists anywhere in the graph.
    fn has_negative_cycle(&self, graph: &WeightMatrix, scratch: &mut Scratch) -> bool;

    /// Detects a negative cycle and reconstructs it.
    ///
    /// Returns `Ok(Some(cycle))` if a negative cycle is found,
    /// `Ok(None)` if none exists, or `Err(e)` on failure.
    fn find_negative_cycle(
        &self,
        graph: &WeightMatrix,
        scratch: &mut Scratch,
    ) -> Result<Option<WeightedCycle>, Error>;
}
