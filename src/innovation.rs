//! Innovation tracking for NEAT.
//!
//! An innovation number names a structural change: the first time a
//! connection between a given `(source, target)` pair of node positions
//! appears anywhere in a pool, it receives the next number from the pool's
//! counter. Every later connection with the same endpoints, in any genome of
//! the same pool and in any generation, reuses that number. Crossover aligns
//! genomes of different shape by these numbers.
//!
//! The tracker is owned by the pool's [`PoolContext`](crate::genome::PoolContext)
//! and only mutated during the single-threaded mutation phases.

use std::collections::HashMap;

use log::trace;

use crate::gene::ConnectionGene;

/// First innovation number handed out by a fresh tracker.
const FIRST_INNOVATION: u64 = 1;

/// Maps connection endpoints to pool-wide innovation numbers.
#[derive(Debug, Clone)]
pub struct InnovationTracker {
    next_innovation: u64,
    table: HashMap<(usize, usize), u64>,
}

impl Default for InnovationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InnovationTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_innovation: FIRST_INNOVATION,
            table: HashMap::new(),
        }
    }

    /// The innovation number already registered for a connection's endpoints.
    ///
    /// Weight and enabled state play no part in the lookup.
    #[must_use]
    pub fn get(&self, gene: &ConnectionGene) -> Option<u64> {
        self.table.get(&gene.endpoints()).copied()
    }

    /// Assign an innovation number to `gene`, registering its endpoints if new.
    ///
    /// Returns the assigned number.
    pub fn assign(&mut self, gene: &mut ConnectionGene) -> u64 {
        let innovation = match self.table.get(&gene.endpoints()) {
            Some(&existing) => existing,
            None => {
                let innovation = self.next_innovation;
                self.table.insert(gene.endpoints(), innovation);
                self.next_innovation += 1;
                trace!(
                    "new innovation #{innovation} for {} -> {}",
                    gene.source,
                    gene.target
                );
                innovation
            }
        };
        gene.innovation = innovation;
        innovation
    }

    /// The number the next new structural change will receive.
    #[must_use]
    pub const fn next_innovation(&self) -> u64 {
        self.next_innovation
    }

    /// Number of distinct structural changes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no structural change has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
