//! Benchmarks for neat-evolve.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use neat_evolve::{Agent, EvaluationError, Genome, Pool, PoolConfig, PoolContext};

fn mutation_config() -> PoolConfig {
    let mut config = PoolConfig::default();
    config.set_new_node_mutation_rate(0.1);
    config.set_new_connection_mutation_rate(0.3);
    config.set_weight_mutation_amplitude(0.5);
    config
}

/// A genome with a few hidden nodes and extra connections.
fn grown_genome(seed: i64, ctx: &mut PoolContext) -> Genome {
    let mut genome = Genome::new(4, 2, seed, ctx).expect("genome");
    for _ in 0..5 {
        genome.new_node_mutation(ctx).expect("split");
        for _ in 0..3 {
            genome.new_connection_mutation(ctx).expect("connect");
        }
    }
    genome
}

fn output_sum(agent: &mut Agent<'_>) -> Result<(), EvaluationError> {
    let outputs = agent.network_mut().evaluate(&[0.5, -0.5, 1.0, 0.0], 4);
    agent.set_fitness(outputs.iter().sum());
    Ok(())
}

fn bench_genome_creation(c: &mut Criterion) {
    let mut ctx = PoolContext::new(PoolConfig::default());
    let mut seed = 0;

    c.bench_function("genome_new", |b| {
        b.iter(|| {
            seed += 1;
            black_box(Genome::new(4, 2, seed, &mut ctx).expect("genome"));
        });
    });
}

fn bench_mutation(c: &mut Criterion) {
    let mut ctx = PoolContext::new(mutation_config());
    let genome = grown_genome(42, &mut ctx);

    c.bench_function("genome_mutation", |b| {
        let mut g = genome.clone();
        b.iter(|| {
            g.mutate(&mut ctx).expect("mutate");
            black_box(&g);
        });
    });
}

fn bench_weight_mutation(c: &mut Criterion) {
    let mut ctx = PoolContext::new(mutation_config());
    let mut genome = grown_genome(42, &mut ctx);

    c.bench_function("weight_strength_mutation", |b| {
        b.iter(|| {
            genome
                .weight_strength_mutation(&ctx.config)
                .expect("weights");
            black_box(&genome);
        });
    });
}

fn bench_crossover(c: &mut Criterion) {
    let mut ctx = PoolContext::new(mutation_config());
    let mut parent1 = grown_genome(1, &mut ctx);
    let mut parent2 = grown_genome(2, &mut ctx);
    parent1.set_fitness(2.0);
    parent2.set_fitness(1.0);

    c.bench_function("genome_crossover", |b| {
        b.iter(|| {
            black_box(Genome::crossover(&mut parent1, &mut parent2, &mut ctx).expect("crossover"));
        });
    });
}

fn bench_network(c: &mut Criterion) {
    let mut ctx = PoolContext::new(mutation_config());
    let genome = grown_genome(7, &mut ctx);

    c.bench_function("build_network", |b| {
        b.iter(|| black_box(genome.build_network()));
    });

    let mut network = genome.build_network();
    c.bench_function("network_update_10", |b| {
        b.iter(|| {
            network.reset();
            black_box(network.evaluate(&[0.5, -0.5, 1.0, 0.0], 10));
        });
    });
}

fn bench_generation(c: &mut Criterion) {
    c.bench_function("pool_generation_100", |b| {
        b.iter_batched(
            || Pool::with_config(mutation_config(), 4, 2, 42, 100, output_sum).expect("pool"),
            |mut pool| {
                pool.evolve(1, f64::INFINITY).expect("generation");
                black_box(pool.generation());
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_genome_creation,
    bench_mutation,
    bench_weight_mutation,
    bench_crossover,
    bench_network,
    bench_generation
);
criterion_main!(benches);
