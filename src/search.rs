//! Search-based subgraph filtering.
//!
//! Matching is word-exact: a query word must equal a whitespace-delimited
//! token of the node label (lowercased on both sides). Substring matching
//! against the whole label is deliberately not used; searching "art" must
//! not match "Heart".

use std::collections::HashSet;

use tracing::debug;

use crate::graph::ConceptGraph;

/// What to show when the query is empty or matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Fall back to the unfiltered full graph.
    #[default]
    FullGraph,
    /// Show exactly the (possibly empty) filtered result.
    MatchesOnly,
}

/// Whether any query word equals any whitespace token of the label.
fn node_matches(label: &str, query_words: &[String]) -> bool {
    label
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .any(|token| query_words.iter().any(|q| *q == token))
}

/// Restrict a graph to nodes matching the query plus their direct neighbors.
///
/// The query is split on whitespace into lowercase words. Every matching
/// node brings in its one-hop predecessors and successors, whether or not
/// those neighbors match. Returns the induced subgraph over the combined
/// set, with edge labels and pair frequencies preserved; an empty query or
/// a query matching nothing yields an empty graph.
pub fn filter_by_search(graph: &ConceptGraph, query: &str) -> ConceptGraph {
    let query_words: Vec<String> = query.split_whitespace().map(|w| w.to_lowercase()).collect();
    if query_words.is_empty() {
        return ConceptGraph::new();
    }

    let mut keep: HashSet<&str> = HashSet::new();
    for label in graph.nodes() {
        if node_matches(label, &query_words) {
            keep.insert(label);
            keep.extend(graph.predecessors(label));
            keep.extend(graph.successors(label));
        }
    }
    debug!(query, kept = keep.len(), "search filter");

    graph.induced_subgraph(&keep)
}

/// Apply the search filter under a view mode.
///
/// [`ViewMode::FullGraph`] returns a clone of the whole graph when the query
/// is empty or matches nothing; [`ViewMode::MatchesOnly`] returns the
/// filtered result as-is.
pub fn view(graph: &ConceptGraph, query: &str, mode: ViewMode) -> ConceptGraph {
    let filtered = filter_by_search(graph, query);
    if filtered.node_count() == 0 && mode == ViewMode::FullGraph {
        return graph.clone();
    }
    filtered
}
