//! In-memory concept graph with label interning.
//!
//! Uses `petgraph` for the directed structure and a side `HashMap` interning
//! table mapping node labels to indices, so node identity is exact
//! case-sensitive string equality without repeated hashing of labels inside
//! the algorithms.
//!
//! One edge exists per (subject, object) pair. A later triplet collapsing
//! onto an existing pair overwrites the relation label, but the per-pair
//! occurrence counter keeps counting; display width uses the count of
//! triplets added, not the surviving label.

pub mod analytics;
pub mod community;

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::warn;

use crate::triplet::Triplet;

/// Data carried by each directed edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeData {
    /// Relation label. Last writer wins when triplets collapse onto one pair.
    pub label: String,
}

/// Directed concept graph: nodes are unique concept labels, edges carry
/// relation labels.
#[derive(Debug, Clone, Default)]
pub struct ConceptGraph {
    /// The directed graph. Node weights are the concept labels.
    graph: DiGraph<String, EdgeData>,
    /// Label → NodeIndex interning table.
    node_index: HashMap<String, NodeIndex>,
    /// Occurrence count per (subject, object) pair, across collapsed triplets.
    pair_frequency: HashMap<(NodeIndex, NodeIndex), usize>,
}

impl ConceptGraph {
    /// Create a new empty concept graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from final triplets.
    ///
    /// Fields are re-trimmed defensively; a triplet with any empty field after
    /// trimming is skipped. An empty input yields an empty graph, a
    /// warning-level condition, not an error.
    pub fn from_triplets(triplets: &[Triplet]) -> Self {
        let mut graph = Self::new();
        if triplets.is_empty() {
            warn!("no triplets provided, building empty concept graph");
            return graph;
        }
        for triplet in triplets {
            graph.add_triplet(triplet);
        }
        graph
    }

    /// Intern a label, creating its node on first sight.
    fn ensure_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(label) {
            return idx;
        }
        let idx = self.graph.add_node(label.to_string());
        self.node_index.insert(label.to_string(), idx);
        idx
    }

    /// Add a single triplet.
    ///
    /// Node insertion is idempotent. The (subject, object) pair's edge is
    /// created on first sight and relabeled on later sightings; the pair's
    /// occurrence counter increments either way.
    pub fn add_triplet(&mut self, triplet: &Triplet) {
        let subject = triplet.subject.trim();
        let relation = triplet.relation.trim();
        let object = triplet.object.trim();
        if subject.is_empty() || relation.is_empty() || object.is_empty() {
            return;
        }

        let subj_idx = self.ensure_node(subject);
        let obj_idx = self.ensure_node(object);

        match self.graph.find_edge(subj_idx, obj_idx) {
            Some(edge) => {
                self.graph[edge].label = relation.to_string();
            }
            None => {
                self.graph.add_edge(
                    subj_idx,
                    obj_idx,
                    EdgeData {
                        label: relation.to_string(),
                    },
                );
            }
        }
        *self.pair_frequency.entry((subj_idx, obj_idx)).or_insert(0) += 1;
    }

    /// All node labels, in insertion order.
    pub fn nodes(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    /// All edges as (subject, object, data) tuples, in insertion order.
    pub fn edges(&self) -> Vec<(&str, &str, &EdgeData)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].as_str(),
                    self.graph[e.target()].as_str(),
                    e.weight(),
                )
            })
            .collect()
    }

    /// Whether a node with this exact label exists.
    pub fn contains_node(&self, label: &str) -> bool {
        self.node_index.contains_key(label)
    }

    /// Direct predecessors of a node (sources of incoming edges).
    pub fn predecessors(&self, label: &str) -> Vec<&str> {
        self.neighbors(label, Direction::Incoming)
    }

    /// Direct successors of a node (targets of outgoing edges).
    pub fn successors(&self, label: &str) -> Vec<&str> {
        self.neighbors(label, Direction::Outgoing)
    }

    fn neighbors(&self, label: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.node_index.get(label) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].as_str())
            .collect()
    }

    /// Total degree (in + out) of a node, 0 for unknown labels.
    pub fn degree(&self, label: &str) -> usize {
        let Some(&idx) = self.node_index.get(label) else {
            return 0;
        };
        self.graph.edges_directed(idx, Direction::Incoming).count()
            + self.graph.edges_directed(idx, Direction::Outgoing).count()
    }

    /// Relation label on the (subject, object) edge, if present.
    pub fn edge_label(&self, subject: &str, object: &str) -> Option<&str> {
        let s = *self.node_index.get(subject)?;
        let o = *self.node_index.get(object)?;
        let edge = self.graph.find_edge(s, o)?;
        Some(self.graph[edge].label.as_str())
    }

    /// How many triplets collapsed onto the (subject, object) pair.
    ///
    /// This is intentionally independent of the edge set: the graph stores one
    /// edge per pair, but width scaling needs the number of additions.
    pub fn edge_frequency(&self, subject: &str, object: &str) -> usize {
        let (Some(&s), Some(&o)) = (self.node_index.get(subject), self.node_index.get(object))
        else {
            return 0;
        };
        self.pair_frequency.get(&(s, o)).copied().unwrap_or(0)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct (subject, object) edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Induced subgraph over the given labels.
    ///
    /// Keeps every edge whose endpoints are both retained, preserving relation
    /// labels and pair frequencies. Node insertion order follows the original
    /// graph. Unknown labels are ignored.
    pub fn induced_subgraph(&self, labels: &std::collections::HashSet<&str>) -> ConceptGraph {
        let mut sub = ConceptGraph::new();
        for idx in self.graph.node_indices() {
            let label = self.graph[idx].as_str();
            if labels.contains(label) {
                sub.ensure_node(label);
            }
        }
        for e in self.graph.edge_references() {
            let u = self.graph[e.source()].as_str();
            let v = self.graph[e.target()].as_str();
            if labels.contains(u) && labels.contains(v) {
                let ui = sub.ensure_node(u);
                let vi = sub.ensure_node(v);
                sub.graph.add_edge(ui, vi, e.weight().clone());
                let freq = self
                    .pair_frequency
                    .get(&(e.source(), e.target()))
                    .copied()
                    .unwrap_or(1);
                sub.pair_frequency.insert((ui, vi), freq);
            }
        }
        sub
    }

    /// The underlying petgraph structure, for the analysis algorithms.
    pub(crate) fn petgraph(&self) -> &DiGraph<String, EdgeData> {
        &self.graph
    }

    /// Index of a label in the underlying graph.
    pub(crate) fn index_of(&self, label: &str) -> Option<NodeIndex> {
        self.node_index.get(label).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str, r: &str, o: &str) -> Triplet {
        Triplet::new(s, r, o)
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let g = ConceptGraph::from_triplets(&[]);
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn nodes_are_deduplicated() {
        let g = ConceptGraph::from_triplets(&[
            t("Heart", "pumps", "Blood"),
            t("Heart", "contains", "Valves"),
        ]);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.nodes(), vec!["Heart", "Blood", "Valves"]);
    }

    #[test]
    fn node_identity_is_case_sensitive() {
        let g = ConceptGraph::from_triplets(&[
            t("Heart", "pumps", "Blood"),
            t("heart", "pumps", "Blood"),
        ]);
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn collapsing_pair_is_last_write_wins_but_counted() {
        let g = ConceptGraph::from_triplets(&[t("A1", "rel", "B1"), t("A1", "rel2", "B1")]);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edge_label("A1", "B1"), Some("rel2"));
        assert_eq!(g.edge_frequency("A1", "B1"), 2);
    }

    #[test]
    fn opposite_directions_are_distinct_edges() {
        let g = ConceptGraph::from_triplets(&[t("A1", "feeds", "B1"), t("B1", "drains", "A1")]);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.edge_frequency("A1", "B1"), 1);
        assert_eq!(g.edge_frequency("B1", "A1"), 1);
    }

    #[test]
    fn blank_fields_are_skipped_after_retrim() {
        let g = ConceptGraph::from_triplets(&[
            Triplet {
                subject: "  ".into(),
                relation: "rel".into(),
                object: "B1".into(),
            },
            t("A1", "rel", "B1"),
        ]);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn neighbors_and_degree() {
        let g = ConceptGraph::from_triplets(&[
            t("Sun", "warms", "Earth"),
            t("Earth", "holds", "Ocean"),
        ]);
        assert_eq!(g.successors("Sun"), vec!["Earth"]);
        assert_eq!(g.predecessors("Ocean"), vec!["Earth"]);
        assert_eq!(g.degree("Earth"), 2);
        assert_eq!(g.degree("Nowhere"), 0);
    }

    #[test]
    fn induced_subgraph_preserves_labels_and_frequency() {
        let g = ConceptGraph::from_triplets(&[
            t("A1", "rel", "B1"),
            t("A1", "rel", "B1"),
            t("B1", "rel", "C1"),
            t("X1", "rel", "Y1"),
        ]);
        let keep: std::collections::HashSet<&str> = ["A1", "B1", "C1"].into_iter().collect();
        let sub = g.induced_subgraph(&keep);
        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.edge_count(), 2);
        assert_eq!(sub.edge_frequency("A1", "B1"), 2);
        assert!(!sub.contains_node("X1"));
    }
}
