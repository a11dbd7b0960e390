//! Rendering adapter: turns an analyzed concept graph into styled node/edge
//! payloads and an interactive HTML page (vis-network).
//!
//! Node size and color are derived per pass from centrality and community
//! membership; edge width from the per-pair triplet frequency; edge color
//! from a fixed relation-category keyword table. The community palette is
//! shuffled once per render pass: stable within a pass, not across passes
//! unless a seed is pinned.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::VizError;
use crate::graph::ConceptGraph;
use crate::graph::analytics::GraphAnalysis;

/// Fixed palette of visually distinct community colors.
pub const PALETTE: [&str; 9] = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#ffeaa7", "#dda0dd", "#98d8c8", "#f7dc6f",
    "#bb8fce",
];

/// Edge color for relations outside every category.
const DEFAULT_EDGE_COLOR: &str = "#95a5a6";

/// Relation-category color table: first keyword hit wins.
const RELATION_CATEGORIES: &[(&str, &[&str])] = &[
    ("#2ecc71", &["contains", "has", "includes", "consists"]),
    ("#e67e22", &["causes", "leads", "results", "creates"]),
    ("#3498db", &["transmits", "sends", "carries", "flows"]),
    ("#e84393", &["controls", "regulates", "manages"]),
    ("#ff7675", &["connects", "links", "joins"]),
];

/// Node size bounds, in vis-network units.
const NODE_SIZE_MIN: f64 = 15.0;
const NODE_SIZE_MAX: f64 = 40.0;

/// Minimum edge width; frequency emphasis grows from here.
const EDGE_WIDTH_MIN: f64 = 2.0;
const EDGE_WIDTH_MAX: f64 = 8.0;

/// Styling options for one render pass.
#[derive(Debug, Clone, Default)]
pub struct StyleConfig {
    /// Seed for the palette shuffle. `None` shuffles from entropy, so the
    /// community → color mapping varies between passes; pin a seed for
    /// reproducible output.
    pub palette_seed: Option<u64>,
}

/// A styled node ready for the rendering sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisNode {
    /// Node identity (the concept label).
    pub id: String,
    pub label: String,
    /// Tooltip text.
    pub title: String,
    /// Dot size in [15, 40], scaled by centrality.
    pub size: f64,
    /// Fill color (community palette hex).
    pub color: String,
    /// Border color (darkened fill).
    pub border_color: String,
}

/// A styled directed edge ready for the rendering sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisEdge {
    pub from: String,
    pub to: String,
    /// Relation label.
    pub label: String,
    /// Width ≥ 2, emphasized by triplet frequency.
    pub width: f64,
    /// Relation-category color.
    pub color: String,
    /// Arrow direction, always "to".
    pub arrows: String,
}

/// Legend entry for one community.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityLegend {
    pub name: String,
    pub color: String,
    /// Member count.
    pub size: usize,
}

/// The complete styled graph handed to the rendering sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualGraph {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
    pub legend: Vec<CommunityLegend>,
    pub learning_path: Vec<String>,
}

/// Color for a relation label from the fixed category table.
///
/// Matching is lowercased substring containment, scanned in table order.
pub fn relation_color(relation: &str) -> &'static str {
    let lower = relation.to_lowercase();
    for (color, keywords) in RELATION_CATEGORIES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return color;
        }
    }
    DEFAULT_EDGE_COLOR
}

/// Darken a `#rrggbb` color by a factor in (0, 1].
fn darken(hex: &str, factor: f64) -> String {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return hex.to_string();
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map(|v| (v as f64 * factor) as u8)
    };
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => format!("#{r:02x}{g:02x}{b:02x}"),
        _ => hex.to_string(),
    }
}

/// Style an analyzed graph for rendering.
///
/// Performs the per-pass palette shuffle (seeded or from entropy per
/// [`StyleConfig`]) and derives every node/edge attribute. Node iteration
/// order follows graph insertion order.
pub fn style_graph(
    graph: &ConceptGraph,
    analysis: &GraphAnalysis,
    config: &StyleConfig,
) -> VisualGraph {
    let mut rng = match config.palette_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut palette: Vec<&str> = PALETTE.to_vec();
    palette.shuffle(&mut rng);

    let community_color =
        |index: Option<usize>| index.map_or(DEFAULT_EDGE_COLOR, |i| palette[i % palette.len()]);

    let nodes = graph
        .nodes()
        .into_iter()
        .map(|label| {
            let centrality = analysis.centrality.get(label).copied().unwrap_or(0.0);
            let community = analysis.communities.community_of(label);
            let community_name = community
                .and_then(|i| analysis.communities.communities.get(i))
                .map(|c| c.name.as_str())
                .unwrap_or("Unclustered");
            let color = community_color(community).to_string();
            let size = (NODE_SIZE_MIN + 25.0 * centrality).clamp(NODE_SIZE_MIN, NODE_SIZE_MAX);
            VisNode {
                id: label.to_string(),
                label: label.to_string(),
                title: format!("{label}\n{community_name} · centrality {centrality:.2}"),
                size,
                border_color: darken(&color, 0.7),
                color,
            }
        })
        .collect();

    let edges = graph
        .edges()
        .into_iter()
        .map(|(from, to, data)| {
            let frequency = graph.edge_frequency(from, to).max(1);
            let width =
                (EDGE_WIDTH_MIN + 1.5 * (frequency - 1) as f64).clamp(EDGE_WIDTH_MIN, EDGE_WIDTH_MAX);
            VisEdge {
                from: from.to_string(),
                to: to.to_string(),
                label: data.label.clone(),
                width,
                color: relation_color(&data.label).to_string(),
                arrows: "to".into(),
            }
        })
        .collect();

    let legend = analysis
        .communities
        .communities
        .iter()
        .map(|c| CommunityLegend {
            name: c.name.clone(),
            color: community_color(Some(c.index)).to_string(),
            size: c.members.len(),
        })
        .collect();

    VisualGraph {
        nodes,
        edges,
        legend,
        learning_path: analysis.learning_path.clone(),
    }
}

// ---------------------------------------------------------------------------
// HTML export
// ---------------------------------------------------------------------------

/// Render the styled graph as a standalone interactive HTML page.
pub fn to_html(visual: &VisualGraph) -> Result<String, VizError> {
    let nodes: Vec<serde_json::Value> = visual
        .nodes
        .iter()
        .map(|n| {
            serde_json::json!({
                "id": n.id,
                "label": n.label,
                "title": n.title,
                "size": n.size,
                "color": { "background": n.color, "border": n.border_color },
            })
        })
        .collect();
    let edges: Vec<serde_json::Value> = visual
        .edges
        .iter()
        .map(|e| {
            serde_json::json!({
                "from": e.from,
                "to": e.to,
                "label": e.label,
                "title": e.label,
                "width": e.width,
                "color": e.color,
                "arrows": e.arrows,
            })
        })
        .collect();

    let serialize = |value: &Vec<serde_json::Value>| {
        serde_json::to_string(value).map_err(|e| VizError::Serialize {
            message: e.to_string(),
        })
    };
    let nodes_json = serialize(&nodes)?;
    let edges_json = serialize(&edges)?;

    let legend_html: String = visual
        .legend
        .iter()
        .map(|entry| {
            format!(
                "<span class=\"legend-item\"><span class=\"swatch\" style=\"background:{}\"></span>{} ({})</span>",
                entry.color, entry.name, entry.size
            )
        })
        .collect();

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Concept Map</title>
<script src="https://unpkg.com/vis-network/standalone/umd/vis-network.min.js"></script>
<style>
  body {{ margin: 0; background: #222222; color: white; font-family: sans-serif; }}
  #conceptmap {{ width: 100%; height: 600px; }}
  #legend {{ padding: 8px 12px; font-size: 13px; }}
  .legend-item {{ margin-right: 16px; }}
  .swatch {{ display: inline-block; width: 11px; height: 11px; margin-right: 4px; border-radius: 2px; }}
</style>
</head>
<body>
<div id="legend">{legend_html}</div>
<div id="conceptmap"></div>
<script>
  var nodes = new vis.DataSet({nodes_json});
  var edges = new vis.DataSet({edges_json});
  var container = document.getElementById("conceptmap");
  var options = {{
    "nodes": {{ "shape": "dot", "font": {{ "color": "white" }} }},
    "edges": {{ "font": {{ "color": "white", "size": 11 }} }},
    "physics": {{
      "forceAtlas2Based": {{
        "gravitationalConstant": -50,
        "centralGravity": 0.01,
        "springLength": 200,
        "springConstant": 0.08
      }},
      "maxVelocity": 50,
      "minVelocity": 0.1,
      "solver": "forceAtlas2Based",
      "timestep": 0.35
    }}
  }};
  new vis.Network(container, {{ nodes: nodes, edges: edges }}, options);
</script>
</body>
</html>
"#
    ))
}

/// Write the HTML visualization to a file.
pub fn write_html(visual: &VisualGraph, path: impl AsRef<Path>) -> Result<(), VizError> {
    let html = to_html(visual)?;
    std::fs::write(path, html).map_err(|source| VizError::Io { source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::analytics::analyze;
    use crate::triplet::Triplet;

    fn t(s: &str, r: &str, o: &str) -> Triplet {
        Triplet::new(s, r, o)
    }

    fn styled(seed: u64) -> (ConceptGraph, VisualGraph) {
        let g = ConceptGraph::from_triplets(&[
            t("Heart", "pumps", "Blood"),
            t("Heart", "pumps", "Blood"),
            t("Heart", "contains", "Valves"),
            t("Blood", "carries", "Oxygen"),
        ]);
        let analysis = analyze(&g);
        let visual = style_graph(
            &g,
            &analysis,
            &StyleConfig {
                palette_seed: Some(seed),
            },
        );
        (g, visual)
    }

    #[test]
    fn node_sizes_stay_in_bounds() {
        let (_, visual) = styled(1);
        for node in &visual.nodes {
            assert!(node.size >= NODE_SIZE_MIN && node.size <= NODE_SIZE_MAX, "{}", node.size);
        }
        // The hub is the biggest dot.
        let heart = visual.nodes.iter().find(|n| n.id == "Heart").unwrap();
        assert!(visual.nodes.iter().all(|n| n.size <= heart.size));
    }

    #[test]
    fn edge_width_reflects_frequency_with_floor() {
        let (_, visual) = styled(1);
        let pumped = visual
            .edges
            .iter()
            .find(|e| e.from == "Heart" && e.to == "Blood")
            .unwrap();
        let single = visual
            .edges
            .iter()
            .find(|e| e.from == "Blood" && e.to == "Oxygen")
            .unwrap();
        assert_eq!(single.width, EDGE_WIDTH_MIN);
        assert!(pumped.width > single.width);
        for edge in &visual.edges {
            assert!(edge.width >= EDGE_WIDTH_MIN);
            assert_eq!(edge.arrows, "to");
        }
    }

    #[test]
    fn relation_colors_follow_category_table() {
        assert_eq!(relation_color("contains"), "#2ecc71");
        assert_eq!(relation_color("often CAUSES"), "#e67e22");
        assert_eq!(relation_color("transmits signals"), "#3498db");
        assert_eq!(relation_color("regulates"), "#e84393");
        assert_eq!(relation_color("interconnects"), "#ff7675");
        assert_eq!(relation_color("pumps"), DEFAULT_EDGE_COLOR);
    }

    #[test]
    fn seeded_palette_is_deterministic() {
        let (_, first) = styled(42);
        let (_, second) = styled(42);
        for (a, b) in first.nodes.iter().zip(&second.nodes) {
            assert_eq!(a.color, b.color);
            assert_eq!(a.border_color, b.border_color);
        }
    }

    #[test]
    fn border_is_darker_fill() {
        assert_eq!(darken("#ffffff", 0.5), "#7f7f7f");
        assert_eq!(darken("not-a-color", 0.5), "not-a-color");
        let (_, visual) = styled(7);
        for node in &visual.nodes {
            assert_ne!(node.color, node.border_color);
        }
    }

    #[test]
    fn tooltip_names_the_community() {
        let (_, visual) = styled(3);
        for node in &visual.nodes {
            assert!(node.title.contains("concepts") || node.title.contains("Cluster"));
            assert!(node.title.contains("centrality"));
        }
    }

    #[test]
    fn legend_covers_all_communities() {
        let (g, visual) = styled(5);
        let total: usize = visual.legend.iter().map(|l| l.size).sum();
        assert_eq!(total, g.node_count());
        assert_eq!(visual.legend[0].name, "Core concepts");
    }

    #[test]
    fn html_embeds_nodes_and_physics() {
        let (_, visual) = styled(9);
        let html = to_html(&visual).unwrap();
        assert!(html.contains("Heart"));
        assert!(html.contains("forceAtlas2Based"));
        assert!(html.contains("vis.DataSet"));
    }

    #[test]
    fn write_html_creates_file() {
        let (_, visual) = styled(11);
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("concept_map.html");
        write_html(&visual, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("conceptmap"));
    }
}
