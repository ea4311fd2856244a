pub mod cycle_cache;
pub mod graph_detector;
pub mod matrix;
pub mod solver;
pub mod traits;

pub use cycle_cache::{CycleId, CycleProfitCache, PairId, TriggerThreshold};
pub use graph_detector::{ArbitrageOpportunity, GraphArbitrageDetector};
pub use matrix::WeightMatrix;
pub use solver::{BellmanFordSolver, Scratch};
