//! # NEAT Evolve
//!
//! NeuroEvolution of Augmenting Topologies (NEAT): a generational pool of
//! genomes whose network structure grows through mutation and crossover.
//!
//! ## Features
//!
//! - **Shared Innovation Table**: every pool numbers structural changes by
//!   `(source, target)` endpoints, so identical connections line up across
//!   genomes during crossover
//! - **Disable, Don't Delete**: splitting a connection disables it and keeps
//!   the gene, preserving history for later crossovers
//! - **Generational State Machine**: evaluate, sort, eliminate and replenish
//!   in a checked order
//! - **Parallel Evaluation**: fitness callbacks run on a bounded rayon pool;
//!   breeding stays single-threaded and deterministic for a given seed
//! - **Grouped Prototypes**: labelled input and output groups carried through
//!   to the materialized [`Network`]
//!
//! ## Quick Start
//!
//! ```rust
//! use neat_evolve::{Agent, Pool};
//!
//! // Reward networks whose output follows the first input
//! let mut pool = Pool::new(2, 1, 42, 20, |agent: &mut Agent<'_>| {
//!     let output = agent.network_mut().evaluate(&[1.0, 0.0], 3)[0];
//!     agent.set_fitness(-(output - 1.0).abs());
//!     Ok(())
//! })
//! .unwrap();
//!
//! let best = pool.evolve(10, -0.01).unwrap();
//! println!("{best}");
//! ```
//!
//! ## Architecture
//!
//! ### Pool Context
//!
//! Genomes never point back at their pool. Operations that need pool-wide
//! state take a [`PoolContext`] holding the configuration, the innovation
//! table and the genome id counter. Crossover rejects parents (or a context)
//! from different pools.
//!
//! ### Determinism
//!
//! Every genome carries its own ChaCha8 stream forked from its parent's.
//! Breeding consumes the pool's stream in a fixed order, so two pools built
//! with the same seed and fitness function evolve identically regardless of
//! how many evaluation threads run.

pub mod config;
pub mod error;
pub mod gene;
pub mod genome;
pub mod innovation;
pub mod network;
pub mod pool;
pub mod randomizer;
pub mod update_rule;

// Re-exports for convenience
pub use config::PoolConfig;
pub use error::{EvaluationError, NeatError};
pub use gene::{ConnectionGene, NodeGene, NodeGeneGroup, NodeType, UNASSIGNED_INNOVATION};
pub use genome::{Genome, GenomeBuilder, GenomePrototype, PoolContext};
pub use innovation::InnovationTracker;
pub use network::{Network, Neuron, NeuronGroup, Synapse};
pub use pool::{Agent, EvaluationCallback, Pool, PoolState};
pub use randomizer::Randomizer;
pub use update_rule::UpdateRule;
