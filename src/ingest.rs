//! Document ingestion: PDF text extraction and chunking.
//!
//! Extraction uses the `pdf-extract` crate. Chunking packs sentences into
//! word-budgeted chunks, then overlaps consecutive chunks so facts spanning
//! a boundary are seen by the extraction model at least twice; the
//! repetition is what feeds the frequency-first selection policy downstream.

use tracing::debug;

use crate::error::IngestError;

/// Configuration for text chunking.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum words per chunk before a new chunk starts.
    pub max_words: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self { max_words: 512 }
    }
}

/// Extract plain text from PDF bytes.
pub fn extract_text_from_pdf(data: &[u8]) -> Result<String, IngestError> {
    let text = pdf_extract::extract_text_from_mem(data).map_err(|e| IngestError::PdfParse {
        message: e.to_string(),
    })?;
    if text.trim().is_empty() {
        return Err(IngestError::EmptyDocument);
    }
    Ok(text)
}

/// Split text into word-budgeted chunks at sentence boundaries.
///
/// Paragraphs (blank-line separated) are processed independently; within a
/// paragraph, sentences are packed until the next one would exceed the
/// budget. A single sentence longer than the budget becomes its own chunk.
/// Never emits an empty chunk.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<String> {
    let mut chunks = Vec::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
        if paragraph.is_empty() {
            continue;
        }

        let mut current = String::new();
        let mut current_words = 0usize;
        for sentence in split_sentences(&paragraph) {
            let words = sentence.split_whitespace().count();
            if current_words + words >= config.max_words && !current.is_empty() {
                chunks.push(current.trim().to_string());
                current.clear();
                current_words = 0;
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&sentence);
            current_words += words;
        }
        if !current.is_empty() {
            chunks.push(current.trim().to_string());
        }
    }

    debug!(chunks = chunks.len(), "chunked document");
    chunks
}

/// Split text at sentence boundaries (`.`, `!`, `?` followed by whitespace).
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    let chars: Vec<char> = text.chars().collect();
    for (i, &ch) in chars.iter().enumerate() {
        current.push(ch);
        if (ch == '.' || ch == '!' || ch == '?')
            && i + 1 < chars.len()
            && chars[i + 1].is_whitespace()
        {
            let trimmed = current.trim().to_string();
            if !trimmed.is_empty() {
                sentences.push(trimmed);
            }
            current.clear();
        }
    }
    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
    sentences
}

/// Prefix each chunk with its predecessor (overlap of one chunk).
///
/// The first chunk is unchanged. Overlapping windows let the same fact be
/// extracted from adjacent chunks independently, which is what pushes
/// genuinely salient triplets over the repeat-count threshold.
pub fn overlap_chunks(chunks: &[String]) -> Vec<String> {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            if i == 0 {
                chunk.clone()
            } else {
                format!("{} {}", chunks[i - 1], chunk)
            }
        })
        .collect()
}
