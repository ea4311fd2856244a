use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A currency label that was not part of the configured currency set.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// A pair label that does not appear in any configured cycle.
    #[error("Unknown pair: {0}")]
    UnknownPair(String),

    /// The same currency label was configured more than once.
    #[error("Currency {0} is configured more than once.")]
    DuplicateCurrency(String),

    /// A configured cycle has no pairs.
    #[error("Cycle {0} contains no pairs.")]
    EmptyCycle(usize),

    /// Rates must be finite and strictly positive.
    #[error("Invalid exchange rate: {0}")]
    InvalidRate(f64),

    /// Indicates an attempt to access a node index that exceeds the graph size (N).
    #[error("Node index {0} is out of bounds.")]
    NodeIndexOutOfBounds(usize),

    /// Failed to trace the full cycle path, usually due to broken predecessor chains.
    #[error("Cycle path reconstruction failed due to broken predecessor chain.")]
    CycleReconstructionFailed,
}
