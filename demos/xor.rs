//! XOR example for neat-evolve.
//!
//! Evolves a network that solves XOR, the classic neuroevolution benchmark.
//! Maximum fitness is 4.0.
//!
//! Run with: `RUST_LOG=info cargo run --example xor`

use neat_evolve::{
    Agent, EvaluationError, GenomeBuilder, Network, NodeGene, NodeGeneGroup, Pool, PoolConfig,
    UpdateRule,
};

const CASES: [([f64; 2], f64); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];

/// Buffered updates per case; enough for signals to cross two hidden layers.
const STEPS: usize = 6;

fn xor_output(network: &mut Network, inputs: [f64; 2]) -> f64 {
    network.reset();
    network.set_group_activations("Input", &inputs);
    network.set_group_activations("Bias", &[1.0]);
    network.update_n(STEPS);
    network.outputs()[0]
}

fn xor_fitness(agent: &mut Agent<'_>) -> Result<(), EvaluationError> {
    let network = agent.network_mut();
    let error: f64 = CASES
        .iter()
        .map(|&(inputs, expected)| (xor_output(network, inputs) - expected).powi(2))
        .sum();
    if error.is_nan() {
        return Err("network produced NaN".into());
    }
    agent.set_fitness(4.0 - error);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("NEAT XOR Example");
    println!("================\n");

    let mut config = PoolConfig::default();
    config.set_new_node_mutation_rate(0.1);
    config.set_new_connection_mutation_rate(0.3);
    config.set_weight_mutation_amplitude(0.5);
    config.hidden_update_rule = UpdateRule::Sigmoidal;

    let prototype = GenomeBuilder::new()
        .inputs(NodeGene::input(), 2)
        .input_group(NodeGeneGroup::single("Bias", NodeGene::input()))
        .outputs(NodeGene::output().with_update_rule(UpdateRule::Sigmoidal), 1)
        .build()?;

    let population = 150;
    let generations = 300;
    let seed = 42;
    println!("Population: {population}");
    println!("Generations: {generations}");
    println!();

    let mut pool =
        Pool::from_prototype_with_config(config, prototype, seed, population, xor_fitness)?;
    let champion = pool.evolve(generations, 3.9)?.clone();

    println!("Evolution Complete!");
    println!("==================");
    println!("Final generation: {}", pool.generation());
    println!("Best fitness: {:.4}", champion.fitness());
    println!("Nodes: {}", champion.node_genes().len());
    println!("Hidden nodes: {}", champion.num_hidden());
    println!("Connections: {}", champion.num_enabled_connections());

    println!("\nChampion XOR outputs:");
    let mut network = champion.build_network();
    for (inputs, expected) in CASES {
        let output = xor_output(&mut network, inputs);
        let rounded = if output > 0.5 { 1.0 } else { 0.0 };
        let status = if rounded == expected { "ok" } else { "miss" };
        println!(
            "  {} XOR {} = {output:.4} (expected {expected}) {status}",
            inputs[0], inputs[1]
        );
    }

    println!("\n{champion}");
    Ok(())
}
