//! # mindsketch
//!
//! A concept-map engine: extracts (subject, relation, object) triplets from
//! study material via a pluggable relation-extraction model, builds a
//! directed concept graph, and analyzes it for display: community
//! detection, centrality-based sizing, a bounded learning path, and
//! search-based subgraph filtering.
//!
//! ## Architecture
//!
//! - **Triplets** (`triplet`): parsing of model output + validation/selection
//! - **Concept graph** (`graph`): petgraph-backed directed graph with label interning
//! - **Analytics** (`graph::analytics`, `graph::community`): centrality, greedy
//!   modularity communities, learning-path ordering
//! - **Search** (`search`): word-exact match + one-hop neighborhood filtering
//! - **Rendering adapter** (`viz`): styled node/edge payloads + HTML export
//! - **Collaborators** (`extract`, `ingest`): hosted extraction client, PDF
//!   text extraction and chunking
//!
//! ## Library usage
//!
//! ```no_run
//! use mindsketch::extract::{HostedConfig, HostedExtractor};
//! use mindsketch::pipeline::ConceptMapPipeline;
//! use mindsketch::viz::{StyleConfig, style_graph, write_html};
//!
//! let extractor = HostedExtractor::new(HostedConfig {
//!     api_key: "...".into(),
//!     ..Default::default()
//! }).unwrap();
//! let pipeline = ConceptMapPipeline::new(extractor);
//! let map = pipeline.run(&["The heart pumps blood through vessels.".into()]).unwrap();
//! let visual = style_graph(&map.graph, &map.analysis, &StyleConfig::default());
//! write_html(&visual, "concept_map.html").unwrap();
//! ```

pub mod error;
pub mod extract;
pub mod graph;
pub mod ingest;
pub mod pipeline;
pub mod search;
pub mod triplet;
pub mod viz;

pub use error::{SketchError, SketchResult};
pub use graph::ConceptGraph;
pub use graph::analytics::{GraphAnalysis, analyze};
pub use pipeline::{ConceptMap, ConceptMapPipeline};
pub use search::filter_by_search;
pub use triplet::{Triplet, parse_triplets, select_final_triplets};
