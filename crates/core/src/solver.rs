use super::matrix::WeightMatrix;
use super::traits::GraphSolver;
use common::{
    error::Error,
    rate::rate_from_weight,
    types::{Edge, WeightedCycle},
};
use std::f64;

/// Distance and predecessor arrays used by a single Bellman-Ford run.
#[derive(Debug, Clone, Default)]
pub struct Scratch {
    pub distance: Vec<f64>,
    pub predecessor: Vec<Option<usize>>,
}

impl Scratch {
    pub fn new(num_nodes: usize) -> Self {
        let mut scratch = Self::default();
        scratch.reset(num_nodes);
        scratch
    }

    /// distance[sentinel] = 0, every other distance = +inf, no predecessors.
    fn reset(&mut self, num_nodes: usize) {
        self.distance.clear();
        self.distance.resize(num_nodes, f64::INFINITY);
        if let Some(source) = self.distance.get_mut(WeightMatrix::SENTINEL) {
            *source = 0.0;
        }

        self.predecessor.clear();
        self.predecessor.resize(num_nodes, None);
    }

    /// Relaxes `from -> to` if it shortens the distance to `to`.
    fn relax(&mut self, from: usize, to: usize, weight: f64) -> bool {
        let candidate = self.distance[from] + weight;
        if candidate < self.distance[to] {
            self.distance[to] = candidate;
            self.predecessor[to] = Some(from);
            return true;
        }
        false
    }

    fn can_relax(&self, from: usize, to: usize, weight: f64) -> bool {
        self.distance[from] + weight < self.distance[to]
    }
}

/// Outcome of the bounded relaxation passes.
enum Passes {
    /// A full pass relaxed nothing; no negative cycle can exist.
    Stabilized,
    /// Every pass relaxed something; the extra pass decides.
    Exhausted,
}

/// Solver implementing dense Bellman-Ford from the sentinel node for negative cycle detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct BellmanFordSolver;

impl BellmanFordSolver {
    /// Relaxes every edge `num_nodes - 1` times, stopping early once a pass changes nothing.
    fn run_bounded_passes(&self, graph: &WeightMatrix, scratch: &mut Scratch) -> Passes {
        scratch.reset(graph.num_nodes());

        for _ in 0..graph.num_currencies() {
            let mut relaxed = false;
            for (from, to, weight) in graph.edges() {
                relaxed |= scratch.relax(from, to, weight);
            }

            if !relaxed {
                return Passes::Stabilized;
            }
        }

        Passes::Exhausted
    }

    /// Reconstructs a negative cycle after the extra pass relaxed `start`.
    ///
    /// `start` may sit downstream of the cycle rather than on it, so predecessors are
    /// followed until a node repeats; that node is on the cycle. The cycle is then
    /// collected in trading order and rotated to begin at its lowest node id.
    ///
    /// # Errors
    /// Returns `Error::NodeIndexOutOfBounds` if `start` is out of bounds, or
    /// `Error::CycleReconstructionFailed` if the predecessor chain is broken.
    pub fn reconstruct_cycle(
        &self,
        start: usize,
        predecessor: &[Option<usize>],
        graph: &WeightMatrix,
    ) -> Result<WeightedCycle, Error> {
        let num_nodes = graph.num_nodes();
        if start >= num_nodes {
            return Err(Error::NodeIndexOutOfBounds(start));
        }

        let pred_of = |node: usize| -> Result<usize, Error> {
            predecessor
                .get(node)
                .copied()
                .flatten()
                .filter(|&p| p < num_nodes)
                .ok_or(Error::CycleReconstructionFailed)
        };

        let mut visited = vec![false; num_nodes];
        let mut trace_node = start;
        while !visited[trace_node] {
            visited[trace_node] = true;
            trace_node = pred_of(trace_node)?;
        }

        let cycle_start_node = trace_node;
        let mut nodes = vec![cycle_start_node];
        let mut current_node = pred_of(cycle_start_node)?;
        while current_node != cycle_start_node {
            nodes.push(current_node);
            current_node = pred_of(current_node)?;
        }

        // Predecessor order runs backwards.
        nodes.reverse();
        if let Some(lowest) = nodes.iter().enumerate().min_by_key(|&(_, n)| *n).map(|(i, _)| i) {
            nodes.rotate_left(lowest);
        }

        let len = nodes.len();
        let mut path: Vec<Edge> = Vec::with_capacity(len);
        let mut rates: Vec<f64> = Vec::with_capacity(len);
        let mut log_rate_sum = 0.0f64;

        for i in 0..len {
            let (u, v) = (nodes[i], nodes[(i + 1) % len]);
            let weight = graph
                .weight(u, v)
                .ok_or(Error::CycleReconstructionFailed)?;

            let rate = rate_from_weight(weight);
            path.push((u, v, rate));
            rates.push(rate);
            log_rate_sum += weight;
        }

        Ok(WeightedCycle {
            path,
            rates,
            log_rate_sum,
        })
    }
}

impl GraphSolver for BellmanFordSolver {
    fn has_negative_cycle(&self, graph: &WeightMatrix, scratch: &mut Scratch) -> bool {
        if let Passes::Stabilized = self.run_bounded_passes(graph, scratch) {
            return false;
        }

        graph
            .edges()
            .any(|(from, to, weight)| scratch.can_relax(from, to, weight))
    }

    /// Same search as [`GraphSolver::has_negative_cycle`], reporting the first edge that still
    /// relaxes in the extra pass (row-major order) as the cycle's entry point.
    fn find_negative_cycle(
        &self,
        graph: &WeightMatrix,
        scratch: &mut Scratch,
    ) -> Result<Option<WeightedCycle>, Error> {
        if let Passes::Stabilized = self.run_bounded_passes(graph, scratch) {
            return Ok(None);
        }

        let relaxed = graph
            .edges()
            .find(|&(from, to, weight)| scratch.can_relax(from, to, weight));

        match relaxed {
            Some((from, to, _)) => {
                scratch.predecessor[to] = Some(from);
                let cycle = self.reconstruct_cycle(to, &scratch.predecessor, graph)?;
                Ok(Some(cycle))
            }
            None => Ok(None),
        }
    }
}
