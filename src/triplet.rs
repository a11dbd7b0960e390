//! Triplet parsing and selection.
//!
//! Relation-extraction models answer in one of two textual shapes: a
//! parenthesized `(subject, relation, object)` per line, or a bare
//! whitespace-separated token stream per line. [`parse_triplets`] normalizes
//! both into [`Triplet`] values; [`select_final_triplets`] filters out
//! low-value triplets and applies the frequency-first selection policy.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SelectError;

/// Relations too uninformative to plot. Matched against the lowercased relation.
const GENERIC_RELATIONS: &[&str] = &["has", "is", "part", "of", "in", "on", "with"];

/// High-confidence selection needs at least this many repeated triplets;
/// below it, selection falls back to the full valid list.
pub const MIN_FINAL_TRIPLETS: usize = 5;

/// A (subject, relation, object) fact extracted from text.
///
/// Fields are free-text labels. Subjects and objects become graph node
/// identities by exact, case-sensitive string equality; relations become
/// edge labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triplet {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Triplet {
    /// Create a triplet, trimming surrounding whitespace from every field.
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into().trim().to_string(),
            relation: relation.into().trim().to_string(),
            object: object.into().trim().to_string(),
        }
    }

    /// Whether this triplet is worth plotting.
    ///
    /// Rejects empty or near-empty fields, self-loops (subject == object,
    /// case-sensitive), and generic relations ("has", "is", ...).
    pub fn is_valid(&self) -> bool {
        if self.subject.is_empty() || self.relation.is_empty() || self.object.is_empty() {
            return false;
        }
        if self.subject.len() < 2 || self.relation.len() < 2 || self.object.len() < 2 {
            return false;
        }
        if self.subject == self.object {
            return false;
        }
        !GENERIC_RELATIONS.contains(&self.relation.to_lowercase().as_str())
    }
}

impl std::fmt::Display for Triplet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.relation, self.object)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse triplets from raw relation-extraction output.
///
/// Handles both the parenthesized per-line format and bare token streams.
/// Empty input, or output carrying the marker substring "error" (the
/// extraction collaborator flags total failure that way), yields an empty
/// list ("no signal", not a failure). Individual malformed lines are
/// skipped; this function never fails.
pub fn parse_triplets(rel_text: &str) -> Vec<Triplet> {
    if rel_text.is_empty() || rel_text.to_lowercase().contains("error") {
        return Vec::new();
    }

    let mut triplets = Vec::new();
    for line in rel_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed = if line.starts_with('(') && line.ends_with(')') {
            parse_bracketed_line(line)
        } else {
            parse_bare_line(line)
        };
        match parsed {
            Some(t) => triplets.push(t),
            None => debug!(line, "skipping unparseable relation line"),
        }
    }
    triplets
}

/// Parse a `(subject, relation, object)` line.
///
/// The object may itself contain commas: everything after the second comma
/// is rejoined with `", "`.
fn parse_bracketed_line(line: &str) -> Option<Triplet> {
    let content = &line[1..line.len() - 1];
    let parts: Vec<&str> = content.split(',').map(str::trim).collect();
    if parts.len() < 3 {
        return None;
    }
    Some(Triplet::new(parts[0], parts[1], parts[2..].join(", ")))
}

/// Parse a bare `subject relation object` token line.
///
/// Scans split points left to right, taking a single token as the relation,
/// and accepts the first split where both subject and object are non-empty.
/// At most one triplet is emitted per line.
fn parse_bare_line(line: &str) -> Option<Triplet> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return None;
    }
    for i in 1..tokens.len() - 1 {
        let subject = tokens[..i].join(" ");
        let object = tokens[i + 1..].join(" ");
        if !subject.is_empty() && !object.is_empty() {
            return Some(Triplet::new(subject, tokens[i], object));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Which branch of the selection policy produced the final list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Only triplets independently extracted more than once.
    HighConfidence,
    /// The high-confidence set was too small; the full valid list is used.
    FallbackAll,
}

/// Outcome of triplet selection.
#[derive(Debug, Clone)]
pub struct TripletSelection {
    /// The triplets to build the graph from. Under [`SelectionPolicy::FallbackAll`]
    /// this list retains duplicates; the graph builder collapses them and the
    /// analyzer counts them for edge-width emphasis.
    pub triplets: Vec<Triplet>,
    /// Which policy branch was taken.
    pub policy: SelectionPolicy,
    /// Raw triplet count before validation.
    pub raw_count: usize,
    /// Triplet count after validation, before the frequency cut.
    pub valid_count: usize,
}

/// Filter raw triplets and apply the frequency-first selection policy.
///
/// A triplet qualifies as high-confidence only if its exact (s, r, o) tuple
/// occurs more than once across chunks. When fewer than
/// [`MIN_FINAL_TRIPLETS`] qualify, the full valid list is used instead: a
/// noisy graph beats one too sparse to be useful.
///
/// The two empty outcomes are distinct errors: [`SelectError::EmptyInput`]
/// when nothing was parsed at all, [`SelectError::AllFiltered`] when raw
/// triplets existed but none survived validation.
pub fn select_final_triplets(raw: &[Triplet]) -> Result<TripletSelection, SelectError> {
    if raw.is_empty() {
        return Err(SelectError::EmptyInput);
    }

    let valid: Vec<Triplet> = raw.iter().filter(|t| t.is_valid()).cloned().collect();
    if valid.is_empty() {
        return Err(SelectError::AllFiltered { raw_count: raw.len() });
    }

    let mut counts: HashMap<&Triplet, usize> = HashMap::new();
    for t in &valid {
        *counts.entry(t).or_insert(0) += 1;
    }

    // Unique high-confidence triplets, in first-occurrence order.
    let mut seen: HashSet<&Triplet> = HashSet::new();
    let high_confidence: Vec<Triplet> = valid
        .iter()
        .filter(|t| counts[*t] > 1 && seen.insert(*t))
        .cloned()
        .collect();

    let (triplets, policy) = if high_confidence.len() < MIN_FINAL_TRIPLETS {
        debug!(
            high_confidence = high_confidence.len(),
            valid = valid.len(),
            "high-confidence set below threshold, falling back to full valid list"
        );
        (valid.clone(), SelectionPolicy::FallbackAll)
    } else {
        (high_confidence, SelectionPolicy::HighConfidence)
    };

    Ok(TripletSelection {
        triplets,
        policy,
        raw_count: raw.len(),
        valid_count: valid.len(),
    })
}
