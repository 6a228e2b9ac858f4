//! Runnable networks materialized from genomes.
//!
//! A [`Network`] holds one [`Neuron`] per node gene (at the same index) and
//! one [`Synapse`] per enabled connection gene. Genomes may contain cycles,
//! so the network is not evaluated in topological order. Instead every
//! [`update`](Network::update) is a buffered step: all unclamped neurons
//! compute their next activation from the previous activations, then the new
//! values are committed together.

use crate::gene::NodeType;
use crate::update_rule::UpdateRule;

/// A runtime neuron.
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    /// Role of the node gene this neuron was built from.
    pub node_type: NodeType,
    /// Transfer function applied to the summed input.
    pub update_rule: UpdateRule,
    /// Current activation.
    pub activation: f64,
    /// Clamped neurons keep their activation across updates.
    pub clamped: bool,
    /// Step used by [`Network::increment`].
    pub increment: f64,
}

/// A runtime weighted edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Synapse {
    /// Source neuron index.
    pub source: usize,
    /// Target neuron index.
    pub target: usize,
    /// Connection strength.
    pub weight: f64,
}

/// A labelled set of neurons, used for the network's inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeuronGroup {
    label: String,
    neurons: Vec<usize>,
}

impl NeuronGroup {
    /// The group label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Indices of the member neurons, in node-gene order.
    #[must_use]
    pub fn neurons(&self) -> &[usize] {
        &self.neurons
    }

    /// Number of member neurons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    /// Whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }
}

/// Append `index` to the group labelled `label`, creating it on first use.
fn add_to_group(groups: &mut Vec<NeuronGroup>, label: &str, index: usize) {
    match groups.iter_mut().find(|g| g.label == label) {
        Some(group) => group.neurons.push(index),
        None => groups.push(NeuronGroup {
            label: label.to_owned(),
            neurons: vec![index],
        }),
    }
}

/// A complete, directly runnable network.
#[derive(Debug, Clone)]
pub struct Network {
    neurons: Vec<Neuron>,
    synapses: Vec<Synapse>,
    input_groups: Vec<NeuronGroup>,
    output_groups: Vec<NeuronGroup>,
    // CSR layout of incoming synapses: for neuron i they are at
    // [csr_offsets[i]..csr_offsets[i + 1]).
    csr_offsets: Vec<usize>,
    csr_sources: Vec<usize>,
    csr_weights: Vec<f64>,
    /// Next-step activations, reused across updates.
    buffer: Vec<f64>,
}

impl Network {
    /// Assemble a network from neurons and synapses.
    ///
    /// `groups[i]` is the group label of neuron `i`; input and output neurons
    /// without a label fall back to `"Input"` and `"Output"`.
    pub(crate) fn assemble(
        neurons: Vec<Neuron>,
        groups: Vec<Option<&str>>,
        synapses: Vec<Synapse>,
    ) -> Self {
        let mut input_groups = Vec::new();
        let mut output_groups = Vec::new();
        for (index, (neuron, label)) in neurons.iter().zip(&groups).enumerate() {
            match neuron.node_type {
                NodeType::Input => {
                    add_to_group(&mut input_groups, label.unwrap_or("Input"), index);
                }
                NodeType::Output => {
                    add_to_group(&mut output_groups, label.unwrap_or("Output"), index);
                }
                NodeType::Hidden => {}
            }
        }

        let count = neurons.len();
        let mut incoming: Vec<&Synapse> = synapses.iter().collect();
        // Stable: keeps innovation order within each target, so summation
        // order is deterministic.
        incoming.sort_by_key(|s| s.target);

        let mut csr_offsets = vec![0; count + 1];
        for synapse in &incoming {
            csr_offsets[synapse.target + 1] += 1;
        }
        for i in 0..count {
            csr_offsets[i + 1] += csr_offsets[i];
        }
        let csr_sources = incoming.iter().map(|s| s.source).collect();
        let csr_weights = incoming.iter().map(|s| s.weight).collect();

        Self {
            neurons,
            synapses,
            input_groups,
            output_groups,
            csr_offsets,
            csr_sources,
            csr_weights,
            buffer: vec![0.0; count],
        }
    }

    /// All neurons, indexed like the genome's node genes.
    #[must_use]
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// All synapses, in innovation order.
    #[must_use]
    pub fn synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    /// Input groups, in order of first appearance.
    #[must_use]
    pub fn input_groups(&self) -> &[NeuronGroup] {
        &self.input_groups
    }

    /// Output groups, in order of first appearance.
    #[must_use]
    pub fn output_groups(&self) -> &[NeuronGroup] {
        &self.output_groups
    }

    /// Find an input or output group by label.
    #[must_use]
    pub fn group(&self, label: &str) -> Option<&NeuronGroup> {
        self.input_groups
            .iter()
            .chain(&self.output_groups)
            .find(|g| g.label == label)
    }

    /// Number of input neurons across all input groups.
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.input_groups.iter().map(NeuronGroup::len).sum()
    }

    /// Number of output neurons across all output groups.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.output_groups.iter().map(NeuronGroup::len).sum()
    }

    /// Current activations of all neurons.
    pub fn activations(&self) -> impl Iterator<Item = f64> + '_ {
        self.neurons.iter().map(|n| n.activation)
    }

    /// Set a neuron's activation regardless of clamping.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn force_set_activation(&mut self, index: usize, value: f64) {
        self.neurons[index].activation = value;
    }

    /// Nudge a neuron's activation by its increment.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn increment(&mut self, index: usize) {
        let neuron = &mut self.neurons[index];
        neuron.activation += neuron.increment;
    }

    /// Force the activations of every input neuron, across groups in order.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` does not match the number of input neurons.
    pub fn set_inputs(&mut self, inputs: &[f64]) {
        assert_eq!(
            inputs.len(),
            self.num_inputs(),
            "Input length mismatch: expected {}, got {}",
            self.num_inputs(),
            inputs.len()
        );
        let indices: Vec<usize> = self
            .input_groups
            .iter()
            .flat_map(|g| g.neurons.iter().copied())
            .collect();
        for (index, &value) in indices.into_iter().zip(inputs) {
            self.neurons[index].activation = value;
        }
    }

    /// Force the activations of one group's neurons.
    ///
    /// Returns `false` if no group has this label.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not match the group size.
    pub fn set_group_activations(&mut self, label: &str, values: &[f64]) -> bool {
        let Some(group) = self.group(label) else {
            return false;
        };
        assert_eq!(
            values.len(),
            group.len(),
            "Group '{label}' size mismatch: expected {}, got {}",
            group.len(),
            values.len()
        );
        let indices = group.neurons.clone();
        for (index, &value) in indices.into_iter().zip(values) {
            self.neurons[index].activation = value;
        }
        true
    }

    /// Activations of one group's neurons.
    #[must_use]
    pub fn group_activations(&self, group: &NeuronGroup) -> Vec<f64> {
        group
            .neurons
            .iter()
            .map(|&i| self.neurons[i].activation)
            .collect()
    }

    /// Activations of every output neuron, across groups in order.
    #[must_use]
    pub fn outputs(&self) -> Vec<f64> {
        self.output_groups
            .iter()
            .flat_map(|g| g.neurons.iter().map(|&i| self.neurons[i].activation))
            .collect()
    }

    /// Advance every unclamped neuron by one buffered step.
    pub fn update(&mut self) {
        for (i, neuron) in self.neurons.iter().enumerate() {
            if neuron.clamped {
                self.buffer[i] = neuron.activation;
                continue;
            }
            let mut sum = 0.0;
            for k in self.csr_offsets[i]..self.csr_offsets[i + 1] {
                sum += self.neurons[self.csr_sources[k]].activation * self.csr_weights[k];
            }
            self.buffer[i] = neuron.update_rule.apply(sum);
        }
        for (neuron, &next) in self.neurons.iter_mut().zip(&self.buffer) {
            neuron.activation = next;
        }
    }

    /// Run `steps` buffered updates.
    pub fn update_n(&mut self, steps: usize) {
        for _ in 0..steps {
            self.update();
        }
    }

    /// Set inputs, run `steps` updates, and read the outputs.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` does not match the number of input neurons.
    pub fn evaluate(&mut self, inputs: &[f64], steps: usize) -> Vec<f64> {
        self.set_inputs(inputs);
        self.update_n(steps);
        self.outputs()
    }

    /// Zero every activation.
    pub fn reset(&mut self) {
        for neuron in &mut self.neurons {
            neuron.activation = 0.0;
        }
    }
}
