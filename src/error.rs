//! Rich diagnostic error types for the mindsketch engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Stages of the core pipeline that must
//! never fail (parsing, graph construction, analysis, search) do not appear
//! here at all; their fallbacks are modeled as [`Degradation`] values on the
//! analysis result instead of errors.
//!
//! [`Degradation`]: crate::graph::analytics::Degradation

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the mindsketch engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source chains) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum SketchError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Viz(#[from] VizError),
}

// ---------------------------------------------------------------------------
// Extraction errors
// ---------------------------------------------------------------------------

/// Errors from the hosted relation-extraction client.
#[derive(Debug, Error, Diagnostic)]
pub enum ExtractError {
    #[error("no API key configured for the hosted extraction service")]
    #[diagnostic(
        code(sketch::extract::missing_api_key),
        help(
            "Set the API key in HostedConfig before constructing the client. \
             Keys are issued at the provider's console; mindsketch never reads \
             environment variables itself."
        )
    )]
    MissingApiKey,

    #[error("extraction request failed: {message}")]
    #[diagnostic(
        code(sketch::extract::request_failed),
        help(
            "The HTTP call to the extraction endpoint failed. Check the base URL, \
             network connectivity, and the provider's status page."
        )
    )]
    RequestFailed { message: String },

    #[error("malformed extraction response: {message}")]
    #[diagnostic(
        code(sketch::extract::malformed_response),
        help(
            "The endpoint answered but the body did not match the \
             chat-completions shape. The provider may have changed its API, \
             or the configured base URL points at something else entirely."
        )
    )]
    MalformedResponse { message: String },
}

// ---------------------------------------------------------------------------
// Selection errors
// ---------------------------------------------------------------------------

/// Terminal states of triplet selection.
///
/// These are the only conditions the pipeline surfaces prominently: when
/// selection fails there is nothing downstream to build or render.
#[derive(Debug, Error, Diagnostic)]
pub enum SelectError {
    #[error("no triplets to select from: the raw list is empty")]
    #[diagnostic(
        code(sketch::select::empty_input),
        help(
            "No triplets were parsed from any chunk. Check the extraction output \
             upstream: every chunk may have failed or returned an error marker."
        )
    )]
    EmptyInput,

    #[error("all {raw_count} raw triplet(s) were rejected by the validity filter")]
    #[diagnostic(
        code(sketch::select::all_filtered),
        help(
            "Triplets were parsed but none survived validation (too short, \
             self-referential, or carrying a generic relation like \"has\"). \
             The source text may be too sparse or too noisy to map."
        )
    )]
    AllFiltered { raw_count: usize },
}

// ---------------------------------------------------------------------------
// Ingestion errors
// ---------------------------------------------------------------------------

/// Errors from document ingestion (PDF parsing and chunking).
#[derive(Debug, Error, Diagnostic)]
pub enum IngestError {
    #[error("PDF parse error: {message}")]
    #[diagnostic(
        code(sketch::ingest::pdf_parse),
        help("The document could not be parsed. Verify the file is a valid PDF and not corrupted.")
    )]
    PdfParse { message: String },

    #[error("empty document: no text extracted")]
    #[diagnostic(
        code(sketch::ingest::empty_document),
        help(
            "The parser could not extract any text from the source. The PDF may \
             be image-only (scanned); run OCR first, or supply plain text."
        )
    )]
    EmptyDocument,
}

// ---------------------------------------------------------------------------
// Visualization errors
// ---------------------------------------------------------------------------

/// Errors from the rendering adapter's HTML export.
#[derive(Debug, Error, Diagnostic)]
pub enum VizError {
    #[error("I/O error writing visualization: {source}")]
    #[diagnostic(
        code(sketch::viz::io),
        help("Check that the output directory exists and has write permissions.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(sketch::viz::serialize),
        help("Failed to serialize the visual graph to JSON for embedding.")
    )]
    Serialize { message: String },
}

/// Convenience alias for functions returning mindsketch results.
pub type SketchResult<T> = std::result::Result<T, SketchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_error_converts_to_sketch_error() {
        let err = SelectError::AllFiltered { raw_count: 3 };
        let sketch: SketchError = err.into();
        assert!(matches!(
            sketch,
            SketchError::Select(SelectError::AllFiltered { raw_count: 3 })
        ));
    }

    #[test]
    fn extract_error_converts_to_sketch_error() {
        let err = ExtractError::MissingApiKey;
        let sketch: SketchError = err.into();
        assert!(matches!(sketch, SketchError::Extract(ExtractError::MissingApiKey)));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = SelectError::AllFiltered { raw_count: 7 };
        let msg = format!("{err}");
        assert!(msg.contains('7'));

        let err = ExtractError::RequestFailed {
            message: "connection refused".into(),
        };
        assert!(format!("{err}").contains("connection refused"));
    }
}
