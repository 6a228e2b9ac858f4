//! Error types for genome construction, mutation and pool transitions.

use crate::pool::PoolState;

/// Error type returned by fallible genome and pool operations.
#[derive(Debug, thiserror::Error)]
pub enum NeatError {
    /// Weight bounds where the floor exceeds the ceiling.
    #[error("Invalid weight bounds: floor {floor} is greater than ceiling {ceiling}")]
    InvalidConfiguration { floor: f64, ceiling: f64 },

    /// Structural parameters that cannot produce a genome or pool.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// Crossover between genomes that belong to different pools.
    #[error("Genomes belong to different pools and cannot be crossed over")]
    IncompatiblePool,

    /// A pool transition invoked out of order.
    #[error("Invalid pool state: {actual:?}; expecting: {expected:?}")]
    InvalidPoolState {
        actual: PoolState,
        expected: PoolState,
    },

    /// A mutation operator found nothing eligible to mutate.
    #[error("Genome has no eligible genes for {0}")]
    EmptyGenome(&'static str),

    /// Evaluation was aborted through the pool's cancel handle.
    #[error("Evaluation cancelled")]
    Cancelled,

    /// The evaluation worker pool could not be created.
    #[error("Failed to build evaluation worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// A configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Error type evaluation callbacks may return.
///
/// A failing evaluation only affects its own genome, which receives the
/// worst possible fitness.
pub type EvaluationError = Box<dyn std::error::Error + Send + Sync>;
