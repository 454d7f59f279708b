use crate::config::Weighting;
use crate::error::{EngineError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub type TermId = u32;
/// Position of a document inside an [`Index`]; doubles as its external id.
pub type DocId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pub filename: String,
    pub path: String,
    pub raw_text: String,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, path: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self { filename: filename.into(), path: path.into(), raw_text: raw_text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub filename: String,
    pub path: String,
    pub original_text: String,
    pub processed_text: String,
    pub tokens: Vec<String>,
    pub word_count: usize,
}

impl ProcessedDocument {
    pub fn summary(&self, id: DocId, preview_chars: usize) -> DocumentSummary {
        DocumentSummary {
            id,
            filename: self.filename.clone(),
            original_text_preview: preview(&self.original_text, preview_chars),
            processed_text_preview: preview(&self.processed_text, preview_chars),
            word_count: self.word_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocId,
    pub filename: String,
    pub original_text_preview: String,
    pub processed_text_preview: String,
    pub word_count: usize,
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Terms in lexicographic order; a term's position is its index in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    positions: HashMap<String, TermId>,
}

impl Vocabulary {
    /// Builds from any set of terms. Duplicates collapse and order is sorted.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        terms.sort_unstable();
        terms.dedup();
        let positions = terms.iter().enumerate().map(|(i, t)| (t.clone(), i as TermId)).collect();
        Self { terms, positions }
    }

    pub fn position(&self, term: &str) -> Option<TermId> {
        self.positions.get(term).copied()
    }

    pub fn term(&self, position: TermId) -> Option<&str> {
        self.terms.get(position as usize).map(String::as_str)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Sparse non-negative weights keyed by term position, sorted by position.
/// Positions not stored are zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeightVector {
    dim: usize,
    entries: Vec<(TermId, f64)>,
}

/// A query projected into an index's term space.
pub type QueryVector = WeightVector;

impl WeightVector {
    /// `entries` need not be sorted; zero weights are dropped.
    pub fn new(dim: usize, mut entries: Vec<(TermId, f64)>) -> Self {
        entries.retain(|&(_, w)| w != 0.0);
        entries.sort_unstable_by_key(|&(t, _)| t);
        debug_assert!(entries.iter().all(|&(t, w)| (t as usize) < dim && w >= 0.0));
        Self { dim, entries }
    }

    pub fn zeros(dim: usize) -> Self {
        Self { dim, entries: Vec::new() }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, term: TermId) -> f64 {
        self.entries
            .binary_search_by_key(&term, |&(t, _)| t)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for &(t, w) in &self.entries {
            dense[t as usize] = w;
        }
        dense
    }

    pub(crate) fn scale(&mut self, factor: f64) {
        for (_, w) in self.entries.iter_mut() {
            *w *= factor;
        }
    }

    pub fn l2_norm(&self) -> f64 {
        self.entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt()
    }
}

/// A fully built, immutable index. Only the vectorizer constructs one.
#[derive(Debug, Clone)]
pub struct Index {
    pub(crate) vocabulary: Vocabulary,
    pub(crate) idf: Vec<f64>,
    pub(crate) documents: Vec<ProcessedDocument>,
    pub(crate) vectors: Vec<WeightVector>,
    pub(crate) weighting: Weighting,
    pub(crate) built_at: OffsetDateTime,
}

impl Index {
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self, term: TermId) -> Option<f64> {
        self.idf.get(term as usize).copied()
    }

    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    pub fn documents(&self) -> &[ProcessedDocument] {
        &self.documents
    }

    pub fn vectors(&self) -> &[WeightVector] {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn document(&self, id: DocId) -> Result<&ProcessedDocument> {
        self.documents
            .get(id)
            .ok_or(EngineError::OutOfRange { id, total: self.documents.len() })
    }

    pub fn vector(&self, id: DocId) -> Result<&WeightVector> {
        self.vectors
            .get(id)
            .ok_or(EngineError::OutOfRange { id, total: self.vectors.len() })
    }

    pub fn summaries(&self, preview_chars: usize) -> Vec<DocumentSummary> {
        self.documents
            .iter()
            .enumerate()
            .map(|(id, doc)| doc.summary(id, preview_chars))
            .collect()
    }

    pub fn built_at(&self) -> String {
        self.built_at.format(&Rfc3339).unwrap_or_default()
    }
}

/// The one authoritative index, shared between builders and readers.
///
/// Readers clone the `Arc` and drop the lock at once; a build replaces the
/// whole `Arc`, so a reader never sees a half-built index.
#[derive(Debug, Default)]
pub struct SharedIndex {
    current: RwLock<Option<Arc<Index>>>,
}

impl SharedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<Index>> {
        self.current.read().clone()
    }

    pub fn publish(&self, index: Index) -> Arc<Index> {
        let index = Arc::new(index);
        *self.current.write() = Some(Arc::clone(&index));
        index
    }
}
