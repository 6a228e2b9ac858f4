//! The generational evolution loop.
//!
//! A [`Pool`] owns a population of genomes and moves it through a fixed cycle
//! of states:
//!
//! ```text
//! NewGeneration --evaluate--> Evaluated --sort--> Sorted
//!       ^                                           |
//!       +--replenish_pool-- Eliminated <--eliminate_least_fit
//! ```
//!
//! Each transition checks the current state. Calling `evaluate`, `sort` or
//! `eliminate_least_fit` again right after it succeeded is a no-op; any other
//! out-of-order call fails with [`NeatError::InvalidPoolState`].
//!
//! Evaluation is the only parallel phase. Each genome is materialized into an
//! [`Agent`] and handed to the evaluation callback on the pool's worker
//! threads; every task owns exactly one genome and only reads the
//! generation's evaluation seed. Innovation state is only touched by the
//! single-threaded `replenish_pool` phase.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::PoolConfig;
use crate::error::{EvaluationError, NeatError};
use crate::genome::{compare_fitness, Genome, GenomePrototype, PoolContext};
use crate::innovation::InnovationTracker;
use crate::network::Network;
use crate::randomizer::Randomizer;

/// Position of a pool in its generational cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolState {
    /// Genomes are unevaluated.
    NewGeneration,
    /// Every genome has a fitness.
    Evaluated,
    /// Genomes are ordered by descending fitness.
    Sorted,
    /// Only the survivors remain.
    Eliminated,
}

/// A genome materialized for evaluation.
pub struct Agent<'a> {
    genome: &'a mut Genome,
    network: Network,
    evaluation_seed: i64,
}

impl Agent<'_> {
    /// The genome under evaluation.
    #[must_use]
    pub fn genome(&self) -> &Genome {
        self.genome
    }

    /// The network built from the genome.
    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Record the genome's fitness. Higher is better.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.genome.set_fitness(fitness);
    }

    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.genome.fitness()
    }

    /// Seed shared by every agent of the current generation.
    #[must_use]
    pub const fn evaluation_seed(&self) -> i64 {
        self.evaluation_seed
    }

    /// A randomizer seeded with the generation's evaluation seed.
    #[must_use]
    pub fn randomizer(&self) -> Randomizer {
        Randomizer::new(self.evaluation_seed)
    }
}

/// Fitness function invoked once per genome per generation.
///
/// The callback must call [`Agent::set_fitness`]. Returning an error or
/// panicking gives the genome a fitness of negative infinity.
pub type EvaluationCallback =
    Arc<dyn Fn(&mut Agent<'_>) -> Result<(), EvaluationError> + Send + Sync>;

/// A population of genomes and the loop that evolves it.
pub struct Pool {
    ctx: PoolContext,
    rand: Randomizer,
    genomes: Vec<Genome>,
    instance_count: usize,
    generation: usize,
    state: PoolState,
    evaluation_seed: i64,
    evaluation: EvaluationCallback,
    workers: rayon::ThreadPool,
    cancelled: Arc<AtomicBool>,
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("pool_id", &self.ctx.id())
            .field("generation", &self.generation)
            .field("state", &self.state)
            .field("genomes", &self.genomes.len())
            .field("instance_count", &self.instance_count)
            .finish_non_exhaustive()
    }
}

fn build_workers(config: &PoolConfig) -> Result<rayon::ThreadPool, NeatError> {
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("neat-eval-{i}"));
    if let Some(threads) = config.evaluation_threads {
        builder = builder.num_threads(threads);
    }
    Ok(builder.build()?)
}

/// Borrow two distinct elements mutably.
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = items.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

fn evaluate_genome(
    genome: &mut Genome,
    evaluation_seed: i64,
    evaluation: &(dyn Fn(&mut Agent<'_>) -> Result<(), EvaluationError> + Send + Sync),
) {
    let id = genome.id();
    let network = genome.build_network();
    let mut agent = Agent {
        genome,
        network,
        evaluation_seed,
    };
    match panic::catch_unwind(AssertUnwindSafe(|| evaluation(&mut agent))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!("evaluation of genome {id} failed: {err}");
            agent.set_fitness(f64::NEG_INFINITY);
        }
        Err(_) => {
            warn!("evaluation of genome {id} panicked");
            agent.set_fitness(f64::NEG_INFINITY);
        }
    }
}

impl Pool {
    /// Create a pool of fresh genomes with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`with_config`](Self::with_config).
    pub fn new<F>(
        input_count: usize,
        output_count: usize,
        seed: i64,
        instance_count: usize,
        evaluation: F,
    ) -> Result<Self, NeatError>
    where
        F: Fn(&mut Agent<'_>) -> Result<(), EvaluationError> + Send + Sync + 'static,
    {
        Self::with_config(
            PoolConfig::default(),
            input_count,
            output_count,
            seed,
            instance_count,
            evaluation,
        )
    }

    /// Create a pool of `instance_count` fresh genomes, each seeded from the
    /// pool's randomizer and given one random connection.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidTopology`] for a zero count,
    /// [`NeatError::InvalidConfiguration`] for inverted weight bounds and
    /// [`NeatError::WorkerPool`] if the worker threads cannot be started.
    pub fn with_config<F>(
        config: PoolConfig,
        input_count: usize,
        output_count: usize,
        seed: i64,
        instance_count: usize,
        evaluation: F,
    ) -> Result<Self, NeatError>
    where
        F: Fn(&mut Agent<'_>) -> Result<(), EvaluationError> + Send + Sync + 'static,
    {
        let mut pool = Self::empty(config, seed, instance_count, Arc::new(evaluation))?;
        for _ in 0..instance_count {
            let genome_seed = pool.rand.next_long();
            let genome = Genome::new(input_count, output_count, genome_seed, &mut pool.ctx)?;
            pool.genomes.push(genome);
        }
        pool.evaluation_seed = pool.rand.next_long();
        info!(
            "pool {} created: {instance_count} genomes, {input_count} inputs, {output_count} outputs, seed {seed}",
            pool.ctx.id()
        );
        Ok(pool)
    }

    /// Create a pool of copies of a prototype with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`from_prototype_with_config`](Self::from_prototype_with_config).
    pub fn from_prototype<F>(
        prototype: GenomePrototype,
        seed: i64,
        instance_count: usize,
        evaluation: F,
    ) -> Result<Self, NeatError>
    where
        F: Fn(&mut Agent<'_>) -> Result<(), EvaluationError> + Send + Sync + 'static,
    {
        Self::from_prototype_with_config(
            PoolConfig::default(),
            prototype,
            seed,
            instance_count,
            evaluation,
        )
    }

    /// Create a pool of `instance_count` copies of `prototype`.
    ///
    /// The prototype is reseeded with `seed`; each copy forks its randomizer
    /// from the prototype and receives one random connection.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidTopology`] for a zero count,
    /// [`NeatError::InvalidConfiguration`] for inverted weight bounds and
    /// [`NeatError::WorkerPool`] if the worker threads cannot be started.
    pub fn from_prototype_with_config<F>(
        config: PoolConfig,
        mut prototype: GenomePrototype,
        seed: i64,
        instance_count: usize,
        evaluation: F,
    ) -> Result<Self, NeatError>
    where
        F: Fn(&mut Agent<'_>) -> Result<(), EvaluationError> + Send + Sync + 'static,
    {
        let mut pool = Self::empty(config, seed, instance_count, Arc::new(evaluation))?;
        prototype.reseed(seed);
        for _ in 0..instance_count {
            let genome = prototype.instantiate(&mut pool.ctx)?;
            pool.genomes.push(genome);
        }
        pool.evaluation_seed = pool.rand.next_long();
        info!(
            "pool {} created from prototype: {instance_count} genomes, {} node genes, seed {seed}",
            pool.ctx.id(),
            prototype.node_genes().len()
        );
        Ok(pool)
    }

    fn empty(
        config: PoolConfig,
        seed: i64,
        instance_count: usize,
        evaluation: EvaluationCallback,
    ) -> Result<Self, NeatError> {
        if instance_count == 0 {
            return Err(NeatError::InvalidTopology(
                "a pool needs at least one genome".into(),
            ));
        }
        config.validate()?;
        let workers = build_workers(&config)?;
        Ok(Self {
            ctx: PoolContext::new(config),
            rand: Randomizer::new(seed),
            genomes: Vec::with_capacity(instance_count),
            instance_count,
            generation: 0,
            state: PoolState::NewGeneration,
            evaluation_seed: 0,
            evaluation,
            workers,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    fn expect_state(&self, expected: PoolState) -> Result<(), NeatError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(NeatError::InvalidPoolState {
                actual: self.state,
                expected,
            })
        }
    }

    /// Run up to `max_generations` generations.
    ///
    /// Stops early and returns the top genome as soon as a generation's best
    /// fitness exceeds `fitness_threshold`. Otherwise returns the top genome
    /// after the last generation.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::Cancelled`] if cancelled, and propagates
    /// transition errors.
    pub fn evolve(
        &mut self,
        max_generations: usize,
        fitness_threshold: f64,
    ) -> Result<&Genome, NeatError> {
        for _ in 0..max_generations {
            if self.cancelled.load(Ordering::Relaxed) {
                return Err(NeatError::Cancelled);
            }
            self.evaluate()?;
            self.sort()?;

            let top_fitness = self.genomes[0].fitness();
            info!(
                "generation {}: top fitness {top_fitness:.8}, {} connection genes",
                self.generation,
                self.genomes[0].num_connections()
            );
            if top_fitness > fitness_threshold {
                info!(
                    "fitness threshold {fitness_threshold} reached in generation {}",
                    self.generation
                );
                return Ok(&self.genomes[0]);
            }

            self.eliminate_least_fit()?;
            self.replenish_pool()?;
        }
        self.top_genome()
    }

    /// Evaluate every genome on the worker threads.
    ///
    /// Blocks until all evaluations finish.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidPoolState`] unless in `NewGeneration`
    /// (or already `Evaluated`), and [`NeatError::Cancelled`] if the cancel
    /// handle was set; the pool then stays in `NewGeneration`.
    pub fn evaluate(&mut self) -> Result<(), NeatError> {
        if self.state == PoolState::Evaluated {
            return Ok(());
        }
        self.expect_state(PoolState::NewGeneration)?;

        let evaluation_seed = self.evaluation_seed;
        let evaluation = self.evaluation.as_ref();
        let cancelled = self.cancelled.as_ref();
        let genomes = &mut self.genomes;
        self.workers.install(|| {
            genomes.par_iter_mut().for_each(|genome| {
                if !cancelled.load(Ordering::Relaxed) {
                    evaluate_genome(genome, evaluation_seed, evaluation);
                }
            });
        });

        if self.cancelled.load(Ordering::Relaxed) {
            return Err(NeatError::Cancelled);
        }
        self.state = PoolState::Evaluated;
        debug!("generation {} evaluated", self.generation);
        Ok(())
    }

    /// Order genomes by descending fitness; NaN fitness sorts last.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidPoolState`] unless `Evaluated` (or already `Sorted`).
    pub fn sort(&mut self) -> Result<(), NeatError> {
        if self.state == PoolState::Sorted {
            return Ok(());
        }
        self.expect_state(PoolState::Evaluated)?;
        self.genomes
            .sort_by(|a, b| compare_fitness(b.fitness(), a.fitness()));
        self.state = PoolState::Sorted;
        Ok(())
    }

    /// Keep the best `floor(len * (1 - elimination_rate))` genomes, at least one.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidPoolState`] unless `Sorted` (or already `Eliminated`).
    pub fn eliminate_least_fit(&mut self) -> Result<(), NeatError> {
        if self.state == PoolState::Eliminated {
            return Ok(());
        }
        self.expect_state(PoolState::Sorted)?;
        let total = self.genomes.len();
        let keep = ((total as f64 * (1.0 - self.ctx.config.elimination_rate())).floor()
            as usize)
            .clamp(1, total);
        self.genomes.truncate(keep);
        self.state = PoolState::Eliminated;
        debug!("eliminated {} of {total} genomes", total - keep);
        Ok(())
    }

    /// Refill the population with mutated crossovers of random survivors.
    ///
    /// Parents are drawn uniformly with replacement, so a survivor may be
    /// crossed with itself. Starts the next generation.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidPoolState`] unless `Eliminated`, and
    /// propagates crossover and mutation errors.
    pub fn replenish_pool(&mut self) -> Result<(), NeatError> {
        self.expect_state(PoolState::Eliminated)?;
        let survivors = self.genomes.len();
        let missing = self.instance_count.saturating_sub(survivors);
        // Survivors stay the only genomes until every child is bred.
        let mut offspring = Vec::with_capacity(missing);
        for _ in 0..missing {
            let i = self.rand.next_int(survivors);
            let j = self.rand.next_int(survivors);
            offspring.push(self.breed(i, j)?);
        }
        self.genomes.extend(offspring);
        self.generation += 1;
        self.evaluation_seed = self.rand.next_long();
        self.state = PoolState::NewGeneration;
        debug!(
            "generation {} started: {missing} offspring, {} innovations",
            self.generation,
            self.ctx.innovations.len()
        );
        Ok(())
    }

    fn breed(&mut self, i: usize, j: usize) -> Result<Genome, NeatError> {
        if i == j {
            let mut twin = self.genomes[i].clone();
            Genome::crossover_and_mutate(&mut self.genomes[i], &mut twin, &mut self.ctx)
        } else {
            let (first, second) = pair_mut(&mut self.genomes, i, j);
            Genome::crossover_and_mutate(first, second, &mut self.ctx)
        }
    }

    /// The fittest genome, sorting first if the pool was just evaluated.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`sort`](Self::sort).
    pub fn top_genome(&mut self) -> Result<&Genome, NeatError> {
        if self.state == PoolState::Evaluated {
            self.sort()?;
        }
        Ok(&self.genomes[0])
    }

    /// Flag that aborts evaluation when set to `true`.
    ///
    /// Evaluations already running finish; the rest are skipped.
    #[must_use]
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Replace the evaluation callback.
    pub fn set_evaluation<F>(&mut self, evaluation: F)
    where
        F: Fn(&mut Agent<'_>) -> Result<(), EvaluationError> + Send + Sync + 'static,
    {
        self.evaluation = Arc::new(evaluation);
    }

    #[must_use]
    pub const fn state(&self) -> PoolState {
        self.state
    }

    /// Number of completed replenishments.
    #[must_use]
    pub const fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Population size restored by every replenishment.
    #[must_use]
    pub const fn instance_count(&self) -> usize {
        self.instance_count
    }

    /// Seed shared by all agents of the current generation.
    #[must_use]
    pub const fn evaluation_seed(&self) -> i64 {
        self.evaluation_seed
    }

    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.ctx.config
    }

    /// Mutable access to the configuration.
    ///
    /// The worker thread count is fixed at construction.
    pub fn config_mut(&mut self) -> &mut PoolConfig {
        &mut self.ctx.config
    }

    #[must_use]
    pub const fn innovations(&self) -> &InnovationTracker {
        &self.ctx.innovations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sum of enabled weights: deterministic and varies between genomes.
    fn weight_sum(agent: &mut Agent<'_>) -> Result<(), EvaluationError> {
        let sum = agent
            .genome()
            .connection_genes()
            .filter(|c| c.enabled)
            .map(|c| c.weight)
            .sum();
        agent.set_fitness(sum);
        Ok(())
    }

    fn test_pool(instance_count: usize) -> Pool {
        Pool::new(3, 2, 42, instance_count, weight_sum).unwrap()
    }

    #[test]
    fn test_construction() {
        let pool = test_pool(10);
        assert_eq!(pool.genomes().len(), 10);
        assert_eq!(pool.state(), PoolState::NewGeneration);
        assert_eq!(pool.generation(), 0);
        assert!(pool.genomes().iter().all(|g| g.num_connections() == 1));
        assert!(pool.genomes().iter().all(|g| g.fitness().is_nan()));
    }

    #[test]
    fn test_zero_instances_rejected() {
        assert!(matches!(
            Pool::new(3, 2, 42, 0, weight_sum),
            Err(NeatError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_out_of_order_transitions_fail() {
        let mut pool = test_pool(4);
        assert!(matches!(
            pool.sort(),
            Err(NeatError::InvalidPoolState {
                actual: PoolState::NewGeneration,
                expected: PoolState::Evaluated
            })
        ));
        assert!(pool.eliminate_least_fit().is_err());
        assert!(pool.replenish_pool().is_err());

        pool.evaluate().unwrap();
        assert!(pool.replenish_pool().is_err());
        assert_eq!(pool.state(), PoolState::Evaluated);
    }

    #[test]
    fn test_repeated_transitions_are_noops() {
        let mut pool = test_pool(4);
        pool.evaluate().unwrap();
        pool.evaluate().unwrap();
        pool.sort().unwrap();
        pool.sort().unwrap();
        pool.eliminate_least_fit().unwrap();
        let survivors = pool.genomes().len();
        pool.eliminate_least_fit().unwrap();
        assert_eq!(pool.genomes().len(), survivors);
        assert_eq!(pool.state(), PoolState::Eliminated);
    }

    #[test]
    fn test_elimination_keeps_fittest_half() {
        let mut pool = test_pool(10);
        pool.evaluate().unwrap();
        pool.sort().unwrap();
        let all: Vec<f64> = pool.genomes().iter().map(Genome::fitness).collect();
        pool.eliminate_least_fit().unwrap();

        assert_eq!(pool.genomes().len(), 5);
        let worst_survivor = pool
            .genomes()
            .iter()
            .map(Genome::fitness)
            .fold(f64::INFINITY, f64::min);
        assert!(all[5..].iter().all(|&f| f <= worst_survivor));
    }

    #[test]
    fn test_full_elimination_keeps_one() {
        let mut pool = test_pool(6);
        pool.config_mut().set_elimination_rate(1.0);
        pool.evaluate().unwrap();
        pool.sort().unwrap();
        pool.eliminate_least_fit().unwrap();
        assert_eq!(pool.genomes().len(), 1);
        pool.replenish_pool().unwrap();
        assert_eq!(pool.genomes().len(), 6);
    }

    #[test]
    fn test_replenish_restores_population() {
        let mut pool = test_pool(10);
        for generation in 1..=5 {
            pool.evaluate().unwrap();
            pool.sort().unwrap();
            pool.eliminate_least_fit().unwrap();
            pool.replenish_pool().unwrap();
            assert_eq!(pool.genomes().len(), 10);
            assert_eq!(pool.generation(), generation);
            assert_eq!(pool.state(), PoolState::NewGeneration);
        }
    }

    #[test]
    fn test_evaluation_seed_changes_per_generation() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut pool = Pool::new(2, 1, 5, 4, move |agent: &mut Agent<'_>| {
            sink.lock().unwrap().push(agent.evaluation_seed());
            agent.set_fitness(0.0);
            Ok(())
        })
        .unwrap();

        let first = pool.evaluation_seed();
        pool.evaluate().unwrap();
        pool.sort().unwrap();
        pool.eliminate_least_fit().unwrap();
        pool.replenish_pool().unwrap();
        assert_ne!(pool.evaluation_seed(), first);

        let seeds = seen.lock().unwrap();
        assert_eq!(seeds.len(), 4);
        assert!(seeds.iter().all(|&s| s == first));
    }

    #[test]
    fn test_failed_evaluation_is_isolated() {
        let mut pool = Pool::new(2, 1, 9, 6, |agent: &mut Agent<'_>| {
            if agent.genome().id() % 2 == 0 {
                return Err("sensor offline".into());
            }
            agent.set_fitness(1.0);
            Ok(())
        })
        .unwrap();

        pool.evaluate().unwrap();
        for genome in pool.genomes() {
            if genome.id() % 2 == 0 {
                assert_eq!(genome.fitness(), f64::NEG_INFINITY);
            } else {
                assert_eq!(genome.fitness(), 1.0);
            }
        }
        pool.sort().unwrap();
        assert_eq!(pool.genomes()[0].fitness(), 1.0);
    }

    #[test]
    fn test_panicking_evaluation_is_isolated() {
        let mut pool = Pool::new(2, 1, 9, 4, |agent: &mut Agent<'_>| {
            if agent.genome().id() == 0 {
                panic!("simulated crash");
            }
            agent.set_fitness(2.0);
            Ok(())
        })
        .unwrap();

        pool.evaluate().unwrap();
        assert_eq!(pool.state(), PoolState::Evaluated);
        let crashed = pool.genomes().iter().find(|g| g.id() == 0).unwrap();
        assert_eq!(crashed.fitness(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_cancelled_evaluation() {
        let mut pool = test_pool(4);
        let cancel = pool.cancel_handle();
        cancel.store(true, Ordering::Relaxed);

        assert!(matches!(pool.evaluate(), Err(NeatError::Cancelled)));
        assert_eq!(pool.state(), PoolState::NewGeneration);
        assert!(matches!(pool.evolve(3, 0.0), Err(NeatError::Cancelled)));

        cancel.store(false, Ordering::Relaxed);
        pool.evaluate().unwrap();
        assert_eq!(pool.state(), PoolState::Evaluated);
    }

    #[test]
    fn test_top_genome_sorts_after_evaluation() {
        let mut pool = test_pool(8);
        pool.evaluate().unwrap();
        let best = pool
            .genomes()
            .iter()
            .map(Genome::fitness)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(pool.top_genome().unwrap().fitness(), best);
        assert_eq!(pool.state(), PoolState::Sorted);
    }

    #[test]
    fn test_evolve_stops_at_threshold() {
        let mut pool = test_pool(10);
        let top = pool.evolve(50, f64::NEG_INFINITY).unwrap();
        assert!(top.fitness().is_finite());
        assert_eq!(pool.generation(), 0);
        assert_eq!(pool.state(), PoolState::Sorted);
    }

    #[test]
    fn test_evolve_runs_all_generations() {
        let mut pool = test_pool(10);
        pool.evolve(4, f64::INFINITY).unwrap();
        assert_eq!(pool.generation(), 4);
        assert_eq!(pool.genomes().len(), 10);
    }

    #[test]
    fn test_bounded_worker_pool() {
        let mut config = PoolConfig::default();
        config.evaluation_threads = Some(2);
        let mut pool = Pool::with_config(config, 2, 2, 1, 12, weight_sum).unwrap();
        pool.evaluate().unwrap();
        assert!(pool.genomes().iter().all(|g| !g.fitness().is_nan()));
    }

    #[test]
    fn test_failed_replenish_keeps_only_survivors() {
        let mut pool = test_pool(6);
        pool.config_mut().set_new_node_mutation_rate(1.0);
        pool.evaluate().unwrap();
        pool.sort().unwrap();
        pool.eliminate_least_fit().unwrap();
        let survivors: Vec<u64> = pool.genomes().iter().map(Genome::id).collect();
        for genome in &mut pool.genomes {
            genome.disable_all_connections();
        }

        assert!(matches!(
            pool.replenish_pool(),
            Err(NeatError::EmptyGenome(_))
        ));
        let remaining: Vec<u64> = pool.genomes().iter().map(Genome::id).collect();
        assert_eq!(remaining, survivors);
        assert_eq!(pool.state(), PoolState::Eliminated);
        assert_eq!(pool.generation(), 0);
    }

    #[test]
    fn test_set_evaluation_replaces_callback() {
        let mut pool = test_pool(4);
        pool.set_evaluation(|agent: &mut Agent<'_>| {
            agent.set_fitness(7.5);
            Ok(())
        });
        pool.evaluate().unwrap();
        assert!(pool.genomes().iter().all(|g| g.fitness() == 7.5));
    }

    #[test]
    fn test_pair_mut() {
        let mut items = [1, 2, 3, 4];
        let (a, b) = pair_mut(&mut items, 3, 1);
        std::mem::swap(a, b);
        assert_eq!(items, [1, 4, 3, 2]);
    }
}
