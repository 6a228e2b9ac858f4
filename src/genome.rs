//! NEAT genome: node genes, connection genes, and the genetic operators.
//!
//! A [`Genome`] addresses its node genes by position. Connection genes refer
//! to those positions and are keyed by innovation number, which is what lets
//! [`Genome::crossover`] line up parents of different shape. Node genes are
//! never removed and connection genes are only ever disabled, so positions
//! and innovation numbers stay meaningful for the lifetime of a pool.
//!
//! Operations that introduce structure need the pool's shared state (its
//! configuration and innovation table). That state is passed explicitly as a
//! [`PoolContext`] rather than reached through a back-reference.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use log::trace;

use crate::config::PoolConfig;
use crate::error::NeatError;
use crate::gene::{ConnectionGene, NodeGene, NodeGeneGroup, NodeType};
use crate::innovation::InnovationTracker;
use crate::network::{Network, Neuron, Synapse};
use crate::randomizer::Randomizer;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// State shared by every genome of one pool.
///
/// Genomes remember the id of the context they were created in; crossover
/// refuses to mix genomes from different contexts.
#[derive(Debug)]
pub struct PoolContext {
    id: u64,
    /// Rates and weight bounds used by the mutation operators.
    pub config: PoolConfig,
    /// Pool-wide innovation table.
    pub innovations: InnovationTracker,
    next_genome_id: u64,
}

impl PoolContext {
    /// Create a context with a process-unique id.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self {
            id: NEXT_POOL_ID.fetch_add(1, AtomicOrdering::Relaxed),
            config,
            innovations: InnovationTracker::new(),
            next_genome_id: 0,
        }
    }

    /// The id genomes of this pool carry.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    fn next_genome_id(&mut self) -> u64 {
        let id = self.next_genome_id;
        self.next_genome_id += 1;
        id
    }

    fn random_weight(&self, rand: &mut Randomizer) -> Result<f64, NeatError> {
        rand.next_double_in(self.config.weight_floor(), self.config.weight_ceiling())
    }
}

/// Order two fitness values, ranking NaN below every number.
pub(crate) fn compare_fitness(a: f64, b: f64) -> Ordering {
    let key = |f: f64| if f.is_nan() { f64::NEG_INFINITY } else { f };
    key(a).total_cmp(&key(b))
}

/// Whether `a` should be the primary parent over `b`.
///
/// Higher fitness wins; ties go to the older genome (lower id).
pub(crate) fn ranks_above(a: &Genome, b: &Genome) -> bool {
    match compare_fitness(a.fitness, b.fitness) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => a.id < b.id,
    }
}

/// An evolvable encoding of a network.
///
/// `clone` produces an exact replica that shares the original's id and
/// randomizer state; use [`deep_copy`](Self::deep_copy) for a new pool member.
#[derive(Debug, Clone)]
pub struct Genome {
    id: u64,
    pool_id: u64,
    node_genes: Vec<NodeGene>,
    /// Indices of node genes that may start a connection (input and hidden).
    potential_sources: Vec<usize>,
    /// Indices of node genes that may end a connection (hidden and output).
    potential_targets: Vec<usize>,
    connection_genes: BTreeMap<u64, ConnectionGene>,
    fitness: f64,
    rand: Randomizer,
}

impl Genome {
    /// Create a genome with `input_count` inputs, `output_count` outputs and
    /// one random starting connection.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidTopology`] if either count is zero.
    pub fn new(
        input_count: usize,
        output_count: usize,
        seed: i64,
        ctx: &mut PoolContext,
    ) -> Result<Self, NeatError> {
        let prototype = GenomeBuilder::new()
            .inputs(NodeGene::input(), input_count)
            .outputs(NodeGene::output(), output_count)
            .build()?;
        let mut genome = prototype.instantiate_with(Randomizer::new(seed), ctx);
        genome.new_connection_mutation(ctx)?;
        Ok(genome)
    }

    /// Copy this genome with fresh identity, a forked randomizer and unset fitness.
    ///
    /// Advances this genome's randomizer.
    pub fn deep_copy(&mut self, ctx: &mut PoolContext) -> Self {
        Self {
            id: ctx.next_genome_id(),
            pool_id: self.pool_id,
            node_genes: self.node_genes.clone(),
            potential_sources: self.potential_sources.clone(),
            potential_targets: self.potential_targets.clone(),
            connection_genes: self.connection_genes.clone(),
            fitness: f64::NAN,
            rand: self.rand.fork(),
        }
    }

    /// [`deep_copy`](Self::deep_copy) followed by [`mutate`](Self::mutate).
    ///
    /// # Errors
    ///
    /// Propagates mutation errors.
    pub fn copy_and_mutate(&mut self, ctx: &mut PoolContext) -> Result<Self, NeatError> {
        let mut child = self.deep_copy(ctx);
        child.mutate(ctx)?;
        Ok(child)
    }

    /// Produce a child from two parents of the same pool.
    ///
    /// The fitter parent is primary and seeds the child's randomizer; on a
    /// fitness tie the older genome is primary. Node genes come from the
    /// primary parent if its node list is strictly longer, otherwise from the
    /// other parent. Connection genes are the union of both parents keyed by
    /// innovation number; genes present in both are picked by coin flip.
    ///
    /// Both arguments may be clones of the same genome.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::IncompatiblePool`] if the parents (or `ctx`) belong
    /// to different pools.
    pub fn crossover(
        g1: &mut Genome,
        g2: &mut Genome,
        ctx: &mut PoolContext,
    ) -> Result<Self, NeatError> {
        if g1.pool_id != g2.pool_id || g1.pool_id != ctx.id {
            return Err(NeatError::IncompatiblePool);
        }

        let (primary, secondary) = if ranks_above(g2, g1) { (g2, g1) } else { (g1, g2) };
        let mut rand = primary.rand.fork();
        let primary: &Genome = primary;
        let secondary: &Genome = secondary;

        // Assumes node genes at the same position are interchangeable across
        // the pool; per-node customization of the shorter parent is dropped.
        let larger = if primary.node_genes.len() > secondary.node_genes.len() {
            primary
        } else {
            secondary
        };

        let innovations: BTreeSet<u64> = primary
            .connection_genes
            .keys()
            .chain(secondary.connection_genes.keys())
            .copied()
            .collect();

        let mut connection_genes = BTreeMap::new();
        for innovation in innovations {
            let gene = match (
                primary.connection_genes.get(&innovation),
                secondary.connection_genes.get(&innovation),
            ) {
                (Some(p), Some(s)) => {
                    if rand.next_boolean() {
                        p
                    } else {
                        s
                    }
                }
                (Some(only), None) | (None, Some(only)) => only,
                (None, None) => continue,
            };
            connection_genes.insert(innovation, gene.clone());
        }

        trace!(
            "crossover of genome {} (primary) and {}: {} connection genes",
            primary.id,
            secondary.id,
            connection_genes.len()
        );

        Ok(Self {
            id: ctx.next_genome_id(),
            pool_id: primary.pool_id,
            node_genes: larger.node_genes.clone(),
            potential_sources: larger.potential_sources.clone(),
            potential_targets: larger.potential_targets.clone(),
            connection_genes,
            fitness: f64::NAN,
            rand,
        })
    }

    /// [`crossover`](Self::crossover) followed by [`mutate`](Self::mutate).
    ///
    /// # Errors
    ///
    /// Propagates crossover and mutation errors.
    pub fn crossover_and_mutate(
        g1: &mut Genome,
        g2: &mut Genome,
        ctx: &mut PoolContext,
    ) -> Result<Self, NeatError> {
        let mut child = Self::crossover(g1, g2, ctx)?;
        child.mutate(ctx)?;
        Ok(child)
    }

    /// Apply the configured mutations.
    ///
    /// A new-node mutation happens with the pool's new-node rate, then a
    /// new-connection mutation with the new-connection rate, then every
    /// connection weight is perturbed.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::EmptyGenome`] if a structural mutation was drawn
    /// but the genome has nothing eligible for it.
    pub fn mutate(&mut self, ctx: &mut PoolContext) -> Result<(), NeatError> {
        if self.rand.next_double() < ctx.config.new_node_mutation_rate() {
            self.new_node_mutation(ctx)?;
        }
        if self.rand.next_double() < ctx.config.new_connection_mutation_rate() {
            self.new_connection_mutation(ctx)?;
        }
        self.weight_strength_mutation(&ctx.config)
    }

    /// Split a random enabled connection with a new hidden node.
    ///
    /// The split connection is disabled, not removed. Two new connections
    /// (source -> new node, new node -> target) with random weights take its
    /// place. Returns the index of the new node gene.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::EmptyGenome`] if no connection is enabled. The
    /// genome is left unchanged.
    pub fn new_node_mutation(&mut self, ctx: &mut PoolContext) -> Result<usize, NeatError> {
        let enabled: Vec<u64> = self
            .connection_genes
            .values()
            .filter(|c| c.enabled)
            .map(|c| c.innovation)
            .collect();
        if enabled.is_empty() {
            return Err(NeatError::EmptyGenome("new-node mutation"));
        }

        let split = enabled[self.rand.next_int(enabled.len())];
        let (source, target) = self.connection_genes[&split].endpoints();
        let in_weight = ctx.random_weight(&mut self.rand)?;
        let out_weight = ctx.random_weight(&mut self.rand)?;

        let new_node = self.node_genes.len();
        self.node_genes.push(NodeGene::hidden(ctx.config.hidden_update_rule));
        self.potential_sources.push(new_node);
        self.potential_targets.push(new_node);

        for mut gene in [
            ConnectionGene::new(source, new_node, in_weight),
            ConnectionGene::new(new_node, target, out_weight),
        ] {
            let innovation = ctx.innovations.assign(&mut gene);
            self.connection_genes.insert(innovation, gene);
        }

        if let Some(gene) = self.connection_genes.get_mut(&split) {
            gene.enabled = false;
        }
        Ok(new_node)
    }

    /// Connect a random potential source to a random potential target.
    ///
    /// Returns the innovation number of the added connection, or `None` if
    /// this genome already has a connection between the drawn pair.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::EmptyGenome`] if there are no potential sources
    /// or targets.
    pub fn new_connection_mutation(
        &mut self,
        ctx: &mut PoolContext,
    ) -> Result<Option<u64>, NeatError> {
        if self.potential_sources.is_empty() || self.potential_targets.is_empty() {
            return Err(NeatError::EmptyGenome("new-connection mutation"));
        }

        let source = self.potential_sources[self.rand.next_int(self.potential_sources.len())];
        let target = self.potential_targets[self.rand.next_int(self.potential_targets.len())];
        let weight = ctx.random_weight(&mut self.rand)?;
        let mut gene = ConnectionGene::new(source, target, weight);

        if let Some(existing) = ctx.innovations.get(&gene) {
            if self.connection_genes.contains_key(&existing) {
                return Ok(None);
            }
        }

        let innovation = ctx.innovations.assign(&mut gene);
        self.connection_genes.insert(innovation, gene);
        Ok(Some(innovation))
    }

    /// Perturb every connection weight and clip it into the configured bounds.
    ///
    /// `weight = clip(weight + amplitude * draw, floor, ceiling)` where
    /// `draw` is uniform in `[floor, ceiling)`.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidConfiguration`] if the bounds are inverted.
    pub fn weight_strength_mutation(&mut self, config: &PoolConfig) -> Result<(), NeatError> {
        let amplitude = config.weight_mutation_amplitude();
        for gene in self.connection_genes.values_mut() {
            let draw = self
                .rand
                .next_double_in(config.weight_floor(), config.weight_ceiling())?;
            gene.weight = config.clip_weight(gene.weight + amplitude * draw);
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn disable_all_connections(&mut self) {
        for gene in self.connection_genes.values_mut() {
            gene.enabled = false;
        }
    }

    /// Translate this genome into a runnable network.
    ///
    /// Every node gene becomes a neuron at the same index; input neurons are
    /// clamped. Only enabled connection genes become synapses.
    #[must_use]
    pub fn build_network(&self) -> Network {
        let neurons = self
            .node_genes
            .iter()
            .map(|gene| Neuron {
                node_type: gene.node_type,
                update_rule: gene.update_rule,
                activation: 0.0,
                clamped: gene.clamped || gene.node_type == NodeType::Input,
                increment: gene.increment,
            })
            .collect();
        let groups = self.node_genes.iter().map(|g| g.group.as_deref()).collect();
        let synapses = self
            .connection_genes
            .values()
            .filter(|c| c.enabled)
            .map(|c| Synapse {
                source: c.source,
                target: c.target,
                weight: c.weight,
            })
            .collect();
        Network::assemble(neurons, groups, synapses)
    }

    /// Serial id, unique among genomes created through one [`PoolContext`].
    ///
    /// Clones keep the id of the genome they were cloned from.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Id of the pool this genome belongs to.
    #[must_use]
    pub const fn pool_id(&self) -> u64 {
        self.pool_id
    }

    /// Fitness, NaN until evaluated.
    #[must_use]
    pub const fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    #[must_use]
    pub fn node_genes(&self) -> &[NodeGene] {
        &self.node_genes
    }

    #[must_use]
    pub fn potential_sources(&self) -> &[usize] {
        &self.potential_sources
    }

    #[must_use]
    pub fn potential_targets(&self) -> &[usize] {
        &self.potential_targets
    }

    /// Connection genes in innovation order.
    pub fn connection_genes(&self) -> impl Iterator<Item = &ConnectionGene> {
        self.connection_genes.values()
    }

    /// Look up a connection gene by innovation number.
    #[must_use]
    pub fn connection(&self, innovation: u64) -> Option<&ConnectionGene> {
        self.connection_genes.get(&innovation)
    }

    /// Innovation numbers present in this genome, ascending.
    pub fn innovations(&self) -> impl Iterator<Item = u64> + '_ {
        self.connection_genes.keys().copied()
    }

    /// Number of connection genes, enabled or not.
    #[must_use]
    pub fn num_connections(&self) -> usize {
        self.connection_genes.len()
    }

    /// Number of enabled connection genes.
    #[must_use]
    pub fn num_enabled_connections(&self) -> usize {
        self.connection_genes.values().filter(|c| c.enabled).count()
    }

    /// Number of hidden node genes.
    #[must_use]
    pub fn num_hidden(&self) -> usize {
        self.node_genes
            .iter()
            .filter(|n| n.node_type == NodeType::Hidden)
            .count()
    }
}

impl std::fmt::Display for Genome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "---- Genome {} ----", self.id)?;
        writeln!(f, "Fitness: {:.8}", self.fitness)?;
        writeln!(f, "\nNode genes:")?;
        for (index, gene) in self.node_genes.iter().enumerate() {
            writeln!(f, "{index}: {gene}")?;
        }
        writeln!(f, "\nConnection genes:")?;
        for gene in self.connection_genes.values() {
            writeln!(f, "{gene}")?;
        }
        Ok(())
    }
}

/// Builds a [`GenomePrototype`] from groups of input and output node genes.
///
/// ```rust
/// use neat_evolve::{GenomeBuilder, NodeGene, NodeGeneGroup, UpdateRule};
///
/// let prototype = GenomeBuilder::new()
///     .input_group(NodeGeneGroup::of("Smell-Left", NodeGene::input(), 8))
///     .input_group(NodeGeneGroup::of("Smell-Right", NodeGene::input(), 8))
///     .outputs(NodeGene::output().with_update_rule(UpdateRule::Tanh), 2)
///     .build()
///     .unwrap();
/// assert_eq!(prototype.node_genes().len(), 18);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GenomeBuilder {
    input_groups: Vec<NodeGeneGroup>,
    output_groups: Vec<NodeGeneGroup>,
}

impl GenomeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group of input node genes.
    #[must_use]
    pub fn input_group(mut self, group: NodeGeneGroup) -> Self {
        self.input_groups.push(group);
        self
    }

    /// Add `count` input node genes to a group labelled `"Input"`.
    #[must_use]
    pub fn inputs(self, template: NodeGene, count: usize) -> Self {
        self.input_group(NodeGeneGroup::of("Input", template, count))
    }

    /// Add a group of output node genes.
    #[must_use]
    pub fn output_group(mut self, group: NodeGeneGroup) -> Self {
        self.output_groups.push(group);
        self
    }

    /// Add `count` output node genes to a group labelled `"Output"`.
    #[must_use]
    pub fn outputs(self, template: NodeGene, count: usize) -> Self {
        self.output_group(NodeGeneGroup::of("Output", template, count))
    }

    /// Lay out inputs first, then outputs.
    ///
    /// Genes are retyped to match the side they were added on.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidTopology`] if there are no input or no
    /// output node genes.
    pub fn build(self) -> Result<GenomePrototype, NeatError> {
        let mut node_genes = Vec::new();
        let mut potential_sources = Vec::new();
        let mut potential_targets = Vec::new();

        let inputs = self
            .input_groups
            .into_iter()
            .flat_map(NodeGeneGroup::into_node_genes)
            .map(|gene| NodeGene {
                node_type: NodeType::Input,
                ..gene
            });
        // Outputs always update, whatever template they were made from.
        let outputs = self
            .output_groups
            .into_iter()
            .flat_map(NodeGeneGroup::into_node_genes)
            .map(|gene| NodeGene {
                node_type: NodeType::Output,
                clamped: false,
                ..gene
            });

        for gene in inputs.chain(outputs) {
            let index = node_genes.len();
            if gene.can_be_source() {
                potential_sources.push(index);
            }
            if gene.can_be_target() {
                potential_targets.push(index);
            }
            node_genes.push(gene);
        }

        if potential_sources.is_empty() {
            return Err(NeatError::InvalidTopology(
                "a genome needs at least one input node".into(),
            ));
        }
        if potential_targets.is_empty() {
            return Err(NeatError::InvalidTopology(
                "a genome needs at least one output node".into(),
            ));
        }

        Ok(GenomePrototype {
            node_genes,
            potential_sources,
            potential_targets,
            rand: Randomizer::new(0),
        })
    }
}

/// A genome template without connections or pool membership.
///
/// Pools built from a prototype deep-copy it once per instance and give each
/// copy one random connection.
#[derive(Debug, Clone)]
pub struct GenomePrototype {
    node_genes: Vec<NodeGene>,
    potential_sources: Vec<usize>,
    potential_targets: Vec<usize>,
    rand: Randomizer,
}

impl GenomePrototype {
    #[must_use]
    pub fn node_genes(&self) -> &[NodeGene] {
        &self.node_genes
    }

    /// Reset the randomizer copies are forked from.
    pub fn reseed(&mut self, seed: i64) {
        self.rand = Randomizer::new(seed);
    }

    /// Create a pool member: a forked copy with one random connection.
    ///
    /// # Errors
    ///
    /// Propagates errors from the starting new-connection mutation.
    pub fn instantiate(&mut self, ctx: &mut PoolContext) -> Result<Genome, NeatError> {
        let rand = self.rand.fork();
        let mut genome = self.instantiate_with(rand, ctx);
        genome.new_connection_mutation(ctx)?;
        Ok(genome)
    }

    fn instantiate_with(&self, rand: Randomizer, ctx: &mut PoolContext) -> Genome {
        Genome {
            id: ctx.next_genome_id(),
            pool_id: ctx.id,
            node_genes: self.node_genes.clone(),
            potential_sources: self.potential_sources.clone(),
            potential_targets: self.potential_targets.clone(),
            connection_genes: BTreeMap::new(),
            fitness: f64::NAN,
            rand,
        }
    }
}
