//! End-to-end concept-map pipeline.
//!
//! Orchestrates: relation extraction per chunk → triplet parsing →
//! validation/selection → graph construction → analysis. The pipeline is
//! single-threaded, synchronous, and stateless between runs; every run
//! rebuilds the graph from scratch.
//!
//! A chunk whose extraction call fails is logged and skipped; one bad chunk
//! never aborts the run. The only error surfaced from a non-empty corpus is
//! the selection terminal state ("nothing extractable"), because it means
//! there is nothing downstream to render.

use tracing::{debug, info, warn};

use crate::error::SketchResult;
use crate::extract::RelationExtractor;
use crate::graph::ConceptGraph;
use crate::graph::analytics::{self, GraphAnalysis};
use crate::ingest::{self, ChunkConfig};
use crate::triplet::{self, Triplet, TripletSelection};

/// A finished concept map: the graph plus everything derived from it.
#[derive(Debug, Clone)]
pub struct ConceptMap {
    pub graph: ConceptGraph,
    pub analysis: GraphAnalysis,
    /// How the final triplet list was selected (policy + counts).
    pub selection: TripletSelection,
}

/// The triplet-to-graph pipeline, generic over the extraction collaborator.
pub struct ConceptMapPipeline<E> {
    extractor: E,
}

impl<E: RelationExtractor> ConceptMapPipeline<E> {
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    /// Run the pipeline over pre-chunked text.
    pub fn run(&self, chunks: &[String]) -> SketchResult<ConceptMap> {
        let mut raw: Vec<Triplet> = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            match self.extractor.extract(chunk) {
                Ok(rel_text) => {
                    let parsed = triplet::parse_triplets(&rel_text);
                    debug!(chunk = index, triplets = parsed.len(), "parsed chunk");
                    raw.extend(parsed);
                }
                Err(e) => {
                    warn!(chunk = index, error = %e, "relation extraction failed, skipping chunk");
                }
            }
        }

        let selection = triplet::select_final_triplets(&raw)?;
        info!(
            raw = selection.raw_count,
            selected = selection.triplets.len(),
            policy = ?selection.policy,
            "selected final triplets"
        );

        let graph = ConceptGraph::from_triplets(&selection.triplets);
        let analysis = analytics::analyze(&graph);

        Ok(ConceptMap {
            graph,
            analysis,
            selection,
        })
    }

    /// Convenience entry point: chunk raw document text (with overlap) and run.
    pub fn run_text(&self, text: &str, chunk_config: &ChunkConfig) -> SketchResult<ConceptMap> {
        let chunks = ingest::overlap_chunks(&ingest::chunk_text(text, chunk_config));
        info!(chunks = chunks.len(), "chunked document text");
        self.run(&chunks)
    }
}
