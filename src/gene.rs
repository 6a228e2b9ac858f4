//! Gene types for NEAT genomes.
//!
//! - [`NodeGene`]: a neuron descriptor, addressed by its position in the genome
//! - [`ConnectionGene`]: a weighted edge between two node positions
//! - [`NodeGeneGroup`]: a labelled run of input or output node genes

use crate::update_rule::UpdateRule;

/// Innovation number carried by a connection gene that has not been
/// registered with an [`InnovationTracker`](crate::innovation::InnovationTracker) yet.
pub const UNASSIGNED_INNOVATION: u64 = 0;

/// The role of a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Input node - a clamped sensor; never the target of a connection.
    Input,
    /// Hidden node - created by splitting a connection.
    Hidden,
    /// Output node - never the source of a connection.
    Output,
}

/// A node gene.
///
/// Node genes are never removed from a genome, so their index in the
/// genome's node list is a stable identity across copies and crossover.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGene {
    /// The role of this node.
    pub node_type: NodeType,
    /// Transfer function instantiated at network-build time.
    pub update_rule: UpdateRule,
    /// Label of the input or output group this node belongs to.
    pub group: Option<String>,
    /// Whether the materialized neuron ignores network updates.
    pub clamped: bool,
    /// Step size used when the neuron's activation is nudged externally.
    pub increment: f64,
}

impl NodeGene {
    /// Create a node gene of the given type with default settings.
    ///
    /// Input genes start clamped with an increment of 1.
    #[must_use]
    pub fn new(node_type: NodeType) -> Self {
        let clamped = node_type == NodeType::Input;
        Self {
            node_type,
            update_rule: UpdateRule::default(),
            group: None,
            clamped,
            increment: if clamped { 1.0 } else { 0.1 },
        }
    }

    /// Create an input node gene.
    #[must_use]
    pub fn input() -> Self {
        Self::new(NodeType::Input)
    }

    /// Create an output node gene.
    #[must_use]
    pub fn output() -> Self {
        Self::new(NodeType::Output)
    }

    /// Create a hidden node gene with the given update rule.
    #[must_use]
    pub fn hidden(update_rule: UpdateRule) -> Self {
        Self {
            update_rule,
            ..Self::new(NodeType::Hidden)
        }
    }

    /// Set the update rule.
    #[must_use]
    pub fn with_update_rule(mut self, update_rule: UpdateRule) -> Self {
        self.update_rule = update_rule;
        self
    }

    /// Set the group label.
    #[must_use]
    pub fn with_group(mut self, label: impl Into<String>) -> Self {
        self.group = Some(label.into());
        self
    }

    /// Whether this node may be the source of a connection.
    #[must_use]
    pub fn can_be_source(&self) -> bool {
        self.node_type != NodeType::Output
    }

    /// Whether this node may be the target of a connection.
    #[must_use]
    pub fn can_be_target(&self) -> bool {
        self.node_type != NodeType::Input
    }
}

/// A labelled collection of input or output node genes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGeneGroup {
    label: String,
    node_genes: Vec<NodeGene>,
}

impl NodeGeneGroup {
    /// A group holding a single node gene.
    #[must_use]
    pub fn single(label: impl Into<String>, template: NodeGene) -> Self {
        Self::of(label, template, 1)
    }

    /// A group of `count` copies of `template`, each tagged with `label`.
    #[must_use]
    pub fn of(label: impl Into<String>, template: NodeGene, count: usize) -> Self {
        let label = label.into();
        let gene = template.with_group(label.clone());
        Self {
            label,
            node_genes: vec![gene; count],
        }
    }

    /// The group label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The node genes of this group.
    #[must_use]
    pub fn node_genes(&self) -> &[NodeGene] {
        &self.node_genes
    }

    pub(crate) fn into_node_genes(self) -> Vec<NodeGene> {
        self.node_genes
    }
}

/// A connection gene representing a weighted edge between two node genes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionGene {
    /// Index of the source node gene.
    pub source: usize,
    /// Index of the target node gene.
    pub target: usize,
    /// Connection strength, kept within the pool's weight bounds.
    pub weight: f64,
    /// Disabled connections are kept for crossover alignment but never materialized.
    pub enabled: bool,
    /// Pool-wide identifier of this structural change.
    pub innovation: u64,
}

impl ConnectionGene {
    /// Create an enabled connection whose innovation number is not yet assigned.
    #[must_use]
    pub fn new(source: usize, target: usize, weight: f64) -> Self {
        Self {
            source,
            target,
            weight,
            enabled: true,
            innovation: UNASSIGNED_INNOVATION,
        }
    }

    /// The structural key innovation numbers are assigned by.
    #[must_use]
    pub const fn endpoints(&self) -> (usize, usize) {
        (self.source, self.target)
    }
}

impl std::fmt::Display for NodeGene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} [{:?}]", self.node_type, self.update_rule)?;
        if let Some(group) = &self.group {
            write!(f, " group={group}")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for ConnectionGene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} -> {} w={:.4}{}",
            self.innovation,
            self.source,
            self.target,
            self.weight,
            if self.enabled { "" } else { " (disabled)" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_gene_creation() {
        let input = NodeGene::input();
        assert_eq!(input.node_type, NodeType::Input);
        assert!(input.clamped);
        assert!(input.can_be_source());
        assert!(!input.can_be_target());

        let output = NodeGene::output();
        assert!(!output.clamped);
        assert!(!output.can_be_source());
        assert!(output.can_be_target());

        let hidden = NodeGene::hidden(UpdateRule::Tanh);
        assert_eq!(hidden.update_rule, UpdateRule::Tanh);
        assert!(hidden.can_be_source() && hidden.can_be_target());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = NodeGene::input().with_group("Smell");
        let mut copy = original.clone();
        copy.group = Some("Touch".into());
        copy.increment = 5.0;
        assert_eq!(original.group.as_deref(), Some("Smell"));
        assert_eq!(original.increment, 1.0);

        let conn = ConnectionGene::new(0, 3, 0.5);
        let mut conn_copy = conn.clone();
        conn_copy.enabled = false;
        assert!(conn.enabled);
    }

    #[test]
    fn test_connection_gene_creation() {
        let conn = ConnectionGene::new(1, 2, -0.25);
        assert_eq!(conn.endpoints(), (1, 2));
        assert_eq!(conn.innovation, UNASSIGNED_INNOVATION);
        assert!(conn.enabled);
    }

    #[test]
    fn test_node_gene_group_labels_members() {
        let group = NodeGeneGroup::of("Smell-Left", NodeGene::input(), 8);
        assert_eq!(group.label(), "Smell-Left");
        assert_eq!(group.node_genes().len(), 8);
        assert!(group
            .node_genes()
            .iter()
            .all(|g| g.group.as_deref() == Some("Smell-Left")));
    }
}
