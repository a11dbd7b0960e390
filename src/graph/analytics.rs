//! Graph analytics: centrality, communities, and learning-path ordering.
//!
//! [`analyze`] is infallible by contract. Conditions that would abort a
//! naive implementation (cyclic graph, degenerate community structure) are
//! handled by explicit fallback branches and reported as [`Degradation`]
//! values so callers and tests can see which path ran.

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use tracing::{debug, warn};

use super::ConceptGraph;
use super::community::{self, CommunityAssignment};

/// Maximum number of concepts shown in the learning path.
pub const LEARNING_PATH_LIMIT: usize = 6;

/// A fallback branch taken during analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// Community detection could not run; every node was assigned to a
    /// single default community.
    CommunityFallback {
        /// Why detection was skipped.
        reason: String,
    },
    /// The graph contains a cycle, so the learning path uses node insertion
    /// order instead of a topological order.
    CyclicOrderFallback,
}

/// Result of one analysis pass over a concept graph.
#[derive(Debug, Clone)]
pub struct GraphAnalysis {
    /// Normalized degree centrality per node, in [0, 1].
    pub centrality: HashMap<String, f64>,
    /// Community partition of the node set.
    pub communities: CommunityAssignment,
    /// Bounded, centrality-ranked topological ordering of concepts.
    pub learning_path: Vec<String>,
    /// Fallback branches taken during this pass, empty when none.
    pub degradations: Vec<Degradation>,
}

/// Analyze a concept graph: centrality, communities, learning path.
///
/// Never fails; zero-node graphs produce empty results across the board.
pub fn analyze(graph: &ConceptGraph) -> GraphAnalysis {
    let mut degradations = Vec::new();

    let centrality = degree_centrality(graph);

    let communities = match community::detect_communities(graph) {
        Ok(assignment) => assignment,
        Err(reason) => {
            if graph.node_count() > 0 {
                warn!(%reason, "community detection unavailable, using single community");
                degradations.push(Degradation::CommunityFallback {
                    reason: reason.to_string(),
                });
            }
            CommunityAssignment::single(graph)
        }
    };

    let (learning_path, had_cycle) = learning_path(graph, &centrality);
    if had_cycle {
        debug!("cycle detected, learning path uses insertion order");
        degradations.push(Degradation::CyclicOrderFallback);
    }

    GraphAnalysis {
        centrality,
        communities,
        learning_path,
        degradations,
    }
}

/// Normalized degree centrality: (in + out) / (n − 1).
///
/// Defined as 0 for every node when the graph has at most one node.
pub fn degree_centrality(graph: &ConceptGraph) -> HashMap<String, f64> {
    let n = graph.node_count();
    graph
        .nodes()
        .into_iter()
        .map(|label| {
            let score = if n <= 1 {
                0.0
            } else {
                graph.degree(label) as f64 / (n - 1) as f64
            };
            (label.to_string(), score)
        })
        .collect()
}

/// Ordered sequence of concepts for suggested study order.
///
/// Topological order when the graph is acyclic, node insertion order
/// otherwise (the boolean reports the fallback). Deduplicated
/// case-insensitively keeping first occurrence, stable-sorted by descending
/// centrality (original relative order breaks ties), truncated to
/// [`LEARNING_PATH_LIMIT`].
pub fn learning_path(
    graph: &ConceptGraph,
    centrality: &HashMap<String, f64>,
) -> (Vec<String>, bool) {
    let pg = graph.petgraph();
    let (ordered, had_cycle) = match toposort(pg, None) {
        Ok(order) => (order, false),
        Err(_) => (pg.node_indices().collect(), true),
    };

    let mut seen = HashSet::new();
    let mut path: Vec<String> = ordered
        .into_iter()
        .map(|idx| pg[idx].clone())
        .filter(|label| seen.insert(label.to_lowercase()))
        .collect();

    // Stable sort: ties keep their (topological or insertion) order.
    path.sort_by(|a, b| {
        let ca = centrality.get(a).copied().unwrap_or(0.0);
        let cb = centrality.get(b).copied().unwrap_or(0.0);
        cb.partial_cmp(&ca).unwrap_or(std::cmp::Ordering::Equal)
    });
    path.truncate(LEARNING_PATH_LIMIT);

    (path, had_cycle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triplet::Triplet;

    fn t(s: &str, r: &str, o: &str) -> Triplet {
        Triplet::new(s, r, o)
    }

    #[test]
    fn centrality_of_empty_and_singleton_graphs() {
        let empty = ConceptGraph::new();
        assert!(degree_centrality(&empty).is_empty());

        // Self-referential triplets are filtered upstream, so a true
        // singleton only arises in synthetic graphs; centrality must still
        // be defined.
        let mut single = ConceptGraph::new();
        single.add_triplet(&t("Only", "loops", "Only"));
        let scores = degree_centrality(&single);
        assert_eq!(scores.get("Only"), Some(&0.0));
    }

    #[test]
    fn centrality_of_chain() {
        let g = ConceptGraph::from_triplets(&[t("A1", "to", "B1"), t("B1", "to", "C1")]);
        let scores = degree_centrality(&g);
        assert_eq!(scores["A1"], 0.5);
        assert_eq!(scores["B1"], 1.0);
        assert_eq!(scores["C1"], 0.5);
    }

    #[test]
    fn learning_path_ranks_by_centrality_within_topo_order() {
        // A1 -> B1 -> C1: topological order [A1, B1, C1], then B1 moves first
        // on centrality (1.0 vs 0.5), A1/C1 tie keeps topological order.
        let g = ConceptGraph::from_triplets(&[t("A1", "to", "B1"), t("B1", "to", "C1")]);
        let analysis = analyze(&g);
        assert_eq!(analysis.learning_path, vec!["B1", "A1", "C1"]);
        assert!(!analysis.degradations.contains(&Degradation::CyclicOrderFallback));
    }

    #[test]
    fn cyclic_graph_falls_back_to_insertion_order() {
        let g = ConceptGraph::from_triplets(&[
            t("A1", "to", "B1"),
            t("B1", "to", "C1"),
            t("C1", "to", "A1"),
        ]);
        let analysis = analyze(&g);
        // All centralities equal; stable sort leaves insertion order intact.
        assert_eq!(analysis.learning_path, vec!["A1", "B1", "C1"]);
        assert!(analysis.degradations.contains(&Degradation::CyclicOrderFallback));
    }

    #[test]
    fn learning_path_dedupes_case_insensitively() {
        let g = ConceptGraph::from_triplets(&[
            t("Heart", "pumps", "Blood"),
            t("heart", "fuels", "Muscle"),
        ]);
        let analysis = analyze(&g);
        let lowered: Vec<String> = analysis
            .learning_path
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        let unique: HashSet<&String> = lowered.iter().collect();
        assert_eq!(lowered.len(), unique.len());
        assert!(analysis.learning_path.len() < g.node_count());
    }

    #[test]
    fn learning_path_is_truncated() {
        let triplets: Vec<Triplet> = (0..10)
            .map(|i| t("Hub", "links", &format!("Spoke{i}")))
            .collect();
        let g = ConceptGraph::from_triplets(&triplets);
        let analysis = analyze(&g);
        assert_eq!(analysis.learning_path.len(), LEARNING_PATH_LIMIT);
        // The hub dominates on centrality.
        assert_eq!(analysis.learning_path[0], "Hub");
    }

    #[test]
    fn empty_graph_analyzes_to_empty_results() {
        let analysis = analyze(&ConceptGraph::new());
        assert!(analysis.centrality.is_empty());
        assert!(analysis.communities.is_empty());
        assert!(analysis.learning_path.is_empty());
        // An empty graph is not a degraded analysis.
        assert!(analysis.degradations.is_empty());
    }

    #[test]
    fn degenerate_graph_gets_single_community_degradation() {
        let mut g = ConceptGraph::new();
        g.add_triplet(&t("Only", "loops", "Only"));
        let analysis = analyze(&g);
        assert_eq!(analysis.communities.len(), 1);
        assert!(matches!(
            analysis.degradations.as_slice(),
            [Degradation::CommunityFallback { .. }]
        ));
    }

    #[test]
    fn repeated_analysis_is_stable() {
        let g = ConceptGraph::from_triplets(&[
            t("A1", "feeds", "B1"),
            t("B1", "feeds", "C1"),
            t("C1", "feeds", "A1"),
            t("X1", "feeds", "Y1"),
            t("Y1", "feeds", "Z1"),
            t("Z1", "feeds", "X1"),
            t("A1", "touches", "X1"),
        ]);
        let first = analyze(&g);
        let second = analyze(&g);
        assert_eq!(first.centrality, second.centrality);
        assert_eq!(first.learning_path, second.learning_path);
        for node in g.nodes() {
            assert_eq!(
                first.communities.community_of(node),
                second.communities.community_of(node)
            );
        }
    }
}

