//! Greedy modularity community detection.
//!
//! Agglomerative merging over the undirected projection of the concept graph:
//! every node starts in its own community, and the pair of connected
//! communities with the best modularity gain is merged until no merge
//! improves modularity.
//!
//! Modularity (undirected, unweighted):
//!
//! Q = Σ_c ( e_cc / m − (d_c / 2m)² )
//!
//! where e_cc is the number of intra-community edges, d_c the sum of member
//! degrees, and m the total edge count of the projection. Merging a and b
//! changes Q by e_ab/m − d_a·d_b/(2m²).
//!
//! Detection is fully deterministic: merge candidates are scanned in
//! community-id order and the result is ordered by size descending, ties by
//! earliest member.

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::visit::EdgeRef;

use super::ConceptGraph;

/// Display names for the first communities in detection order.
const COMMUNITY_NAMES: &[&str] = &[
    "Core concepts",
    "Supporting concepts",
    "Related concepts",
    "Secondary concepts",
    "Additional concepts",
];

/// Human-readable name for a community by detection index.
pub fn community_name(index: usize) -> String {
    COMMUNITY_NAMES
        .get(index)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Cluster {}", index + 1))
}

/// A detected community of densely interconnected concepts.
#[derive(Debug, Clone, PartialEq)]
pub struct Community {
    /// Position in detection order (size descending).
    pub index: usize,
    /// Display name ("Core concepts", ..., "Cluster N").
    pub name: String,
    /// Member labels, in node insertion order.
    pub members: Vec<String>,
}

/// Node → community assignment for one analysis pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommunityAssignment {
    /// Communities in detection order.
    pub communities: Vec<Community>,
    membership: HashMap<String, usize>,
}

impl CommunityAssignment {
    /// Community index of a node label, if assigned.
    pub fn community_of(&self, label: &str) -> Option<usize> {
        self.membership.get(label).copied()
    }

    /// Number of communities.
    pub fn len(&self) -> usize {
        self.communities.len()
    }

    /// Whether no communities were detected (empty graph).
    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    fn from_member_sets(graph: &ConceptGraph, mut sets: Vec<Vec<usize>>) -> Self {
        let pg = graph.petgraph();
        let labels: Vec<&str> = pg.node_indices().map(|i| pg[i].as_str()).collect();

        // Detection order: size descending, ties by earliest member index.
        for set in &mut sets {
            set.sort_unstable();
        }
        sets.sort_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));

        let mut membership = HashMap::new();
        let communities = sets
            .into_iter()
            .enumerate()
            .map(|(index, set)| {
                let members: Vec<String> = set
                    .iter()
                    .map(|&i| {
                        membership.insert(labels[i].to_string(), index);
                        labels[i].to_string()
                    })
                    .collect();
                Community {
                    index,
                    name: community_name(index),
                    members,
                }
            })
            .collect();

        Self {
            communities,
            membership,
        }
    }

    /// Everyone in one community, the fallback when detection fails.
    pub(crate) fn single(graph: &ConceptGraph) -> Self {
        let pg = graph.petgraph();
        let all: Vec<usize> = (0..pg.node_count()).collect();
        if all.is_empty() {
            return Self::default();
        }
        Self::from_member_sets(graph, vec![all])
    }
}

/// Why community detection could not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// Fewer than two nodes, nothing to partition.
    TooSmall,
    /// The undirected projection has no edges.
    NoEdges,
}

impl std::fmt::Display for DetectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooSmall => write!(f, "graph has fewer than two nodes"),
            Self::NoEdges => write!(f, "undirected projection has no edges"),
        }
    }
}

/// Detect communities by greedy modularity maximization.
///
/// Works on the undirected projection of the graph (an edge between u and v
/// exists if a directed edge exists in either direction, multiplicity
/// collapsed). Degenerate graphs are reported as [`DetectError`]; the
/// analyzer maps that to the single-community fallback rather than failing
/// the pipeline.
pub fn detect_communities(graph: &ConceptGraph) -> Result<CommunityAssignment, DetectError> {
    let pg = graph.petgraph();
    let n = pg.node_count();
    if n < 2 {
        return Err(DetectError::TooSmall);
    }

    // Undirected projection, multiplicity collapsed.
    let mut undirected: HashSet<(usize, usize)> = HashSet::new();
    for e in pg.edge_references() {
        let (a, b) = (e.source().index(), e.target().index());
        if a != b {
            undirected.insert((a.min(b), a.max(b)));
        }
    }
    let m = undirected.len();
    if m == 0 {
        return Err(DetectError::NoEdges);
    }
    let m = m as f64;

    // Node degrees in the projection.
    let mut degree = vec![0f64; n];
    for &(a, b) in &undirected {
        degree[a] += 1.0;
        degree[b] += 1.0;
    }

    // Community state: each node starts alone. BTreeMaps keep candidate
    // scanning deterministic.
    let mut members: BTreeMap<usize, Vec<usize>> = (0..n).map(|i| (i, vec![i])).collect();
    let mut comm_degree: BTreeMap<usize, f64> = (0..n).map(|i| (i, degree[i])).collect();
    let mut between: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for &(a, b) in &undirected {
        *between.entry((a.min(b), a.max(b))).or_insert(0.0) += 1.0;
    }

    loop {
        // Best merge by modularity gain ΔQ = e_ab/m − d_a·d_b/(2m²).
        let mut best: Option<((usize, usize), f64)> = None;
        for (&(a, b), &e_ab) in &between {
            let gain = e_ab / m - comm_degree[&a] * comm_degree[&b] / (2.0 * m * m);
            if !gain.is_finite() {
                continue;
            }
            let better = match best {
                None => gain > 0.0,
                Some((_, best_gain)) => gain > best_gain,
            };
            if better {
                best = Some(((a, b), gain));
            }
        }
        let Some(((a, b), _)) = best else {
            break;
        };

        // Merge b into a.
        let absorbed = members.remove(&b).unwrap_or_default();
        members.get_mut(&a).expect("merge target exists").extend(absorbed);
        let d_b = comm_degree.remove(&b).unwrap_or(0.0);
        *comm_degree.get_mut(&a).expect("merge target exists") += d_b;

        // Re-route b's inter-community edges to a.
        let stale: Vec<((usize, usize), f64)> = between
            .iter()
            .filter(|&(&(x, y), _)| x == b || y == b)
            .map(|(&k, &w)| (k, w))
            .collect();
        for ((x, y), w) in stale {
            between.remove(&(x, y));
            let other = if x == b { y } else { x };
            if other == a {
                continue; // the merged pair itself, now internal
            }
            *between.entry((a.min(other), a.max(other))).or_insert(0.0) += w;
        }
    }

    Ok(CommunityAssignment::from_member_sets(
        graph,
        members.into_values().collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triplet::Triplet;

    fn t(s: &str, r: &str, o: &str) -> Triplet {
        Triplet::new(s, r, o)
    }

    fn two_cluster_graph() -> ConceptGraph {
        // Cluster 1: A1-B1-C1 densely linked; cluster 2: X1-Y1-Z1; one bridge.
        ConceptGraph::from_triplets(&[
            t("A1", "feeds", "B1"),
            t("B1", "feeds", "C1"),
            t("C1", "feeds", "A1"),
            t("X1", "feeds", "Y1"),
            t("Y1", "feeds", "Z1"),
            t("Z1", "feeds", "X1"),
            t("A1", "touches", "X1"),
        ])
    }

    #[test]
    fn detects_two_clusters() {
        let assignment = detect_communities(&two_cluster_graph()).unwrap();
        assert!(assignment.len() >= 2, "expected at least two communities");

        let a = assignment.community_of("A1").unwrap();
        assert_eq!(assignment.community_of("B1"), Some(a));
        assert_eq!(assignment.community_of("C1"), Some(a));

        let x = assignment.community_of("X1").unwrap();
        assert_eq!(assignment.community_of("Y1"), Some(x));
        assert_eq!(assignment.community_of("Z1"), Some(x));
        assert_ne!(a, x);
    }

    #[test]
    fn detection_is_deterministic() {
        let g = two_cluster_graph();
        let first = detect_communities(&g).unwrap();
        let second = detect_communities(&g).unwrap();
        for node in g.nodes() {
            assert_eq!(first.community_of(node), second.community_of(node));
        }
    }

    #[test]
    fn degenerate_graphs_are_reported() {
        let empty = ConceptGraph::new();
        assert_eq!(detect_communities(&empty), Err(DetectError::TooSmall));

        let single = ConceptGraph::from_triplets(&[t("A1", "feeds", "A1x")]);
        // Two nodes, one edge: detectable, merges into one community.
        let assignment = detect_communities(&single).unwrap();
        assert_eq!(assignment.len(), 1);
    }

    #[test]
    fn single_fallback_covers_all_nodes() {
        let g = two_cluster_graph();
        let assignment = CommunityAssignment::single(&g);
        assert_eq!(assignment.len(), 1);
        assert_eq!(assignment.communities[0].members.len(), g.node_count());
        assert!(g.nodes().iter().all(|n| assignment.community_of(n) == Some(0)));
    }

    #[test]
    fn communities_ordered_by_size() {
        // A three-node cycle plus a detached pair (connected to the cycle by
        // nothing, except detection needs edges, so keep them as a pair).
        let g = ConceptGraph::from_triplets(&[
            t("A1", "feeds", "B1"),
            t("B1", "feeds", "C1"),
            t("C1", "feeds", "A1"),
            t("P1", "feeds", "Q1"),
        ]);
        let assignment = detect_communities(&g).unwrap();
        assert!(assignment.communities[0].members.len() >= assignment.communities[1].members.len());
        assert_eq!(assignment.communities[0].name, "Core concepts");
        assert_eq!(assignment.communities[1].name, "Supporting concepts");
    }

    #[test]
    fn community_names_past_the_fixed_list() {
        assert_eq!(community_name(0), "Core concepts");
        assert_eq!(community_name(4), "Additional concepts");
        assert_eq!(community_name(5), "Cluster 6");
        assert_eq!(community_name(9), "Cluster 10");
    }
}
