//! TF-IDF term space: builds an [`Index`] from processed documents and
//! projects queries into it.
//!
//! Weights are `tf(d, t) * idf(t)` with raw counts for `tf`. With
//! `smooth_idf` the idf is `ln((1 + N) / (1 + df)) + 1`, which stays finite
//! and positive for every `df` in `0..=N`; without it the idf is
//! `ln(N / max(df, 1))`, so a term found in every document weighs nothing.
//! With `l2_normalize` each vector is scaled to unit length afterwards.

use crate::config::Weighting;
use crate::error::{EngineError, Result};
use crate::index::{DocId, Index, ProcessedDocument, QueryVector, TermId, Vocabulary, WeightVector};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Default)]
pub struct VectorIndexer {
    weighting: Weighting,
}

impl VectorIndexer {
    pub fn new(weighting: Weighting) -> Self {
        Self { weighting }
    }

    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// Builds a brand-new index over `documents`, keeping their order.
    pub fn build_index(&self, documents: Vec<ProcessedDocument>) -> Result<Index> {
        if documents.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }
        let vocabulary = Vocabulary::from_terms(
            documents
                .iter()
                .flat_map(|d| d.processed_text.split_whitespace())
                .collect::<BTreeSet<&str>>(),
        );
        if vocabulary.is_empty() {
            return Err(EngineError::IndexingFailure(
                "empty vocabulary: every document was filtered to nothing".into(),
            ));
        }

        let counts: Vec<HashMap<TermId, u32>> = documents
            .iter()
            .map(|d| term_counts(&vocabulary, &d.processed_text))
            .collect();

        let mut df = vec![0u32; vocabulary.len()];
        for doc_counts in &counts {
            for &term in doc_counts.keys() {
                df[term as usize] += 1;
            }
        }
        let n = documents.len();
        let idf: Vec<f64> = df.iter().map(|&df_t| idf_weight(self.weighting, n, df_t)).collect();

        let vectors: Vec<WeightVector> = counts
            .into_iter()
            .map(|c| weigh(self.weighting, &idf, c))
            .collect();

        tracing::info!(num_docs = n, num_terms = vocabulary.len(), "built tf-idf term space");
        Ok(Index {
            vocabulary,
            idf,
            documents,
            vectors,
            weighting: self.weighting,
            built_at: OffsetDateTime::now_utc(),
        })
    }
}

fn idf_weight(weighting: Weighting, n: usize, df_t: u32) -> f64 {
    let n = n as f64;
    if weighting.smooth_idf {
        ((1.0 + n) / (1.0 + df_t as f64)).ln() + 1.0
    } else {
        (n / df_t.max(1) as f64).ln()
    }
}

/// Raw counts of the whitespace-separated terms of `text` that the vocabulary knows.
fn term_counts(vocabulary: &Vocabulary, text: &str) -> HashMap<TermId, u32> {
    let mut counts = HashMap::new();
    for term in text.split_whitespace() {
        if let Some(tid) = vocabulary.position(term) {
            *counts.entry(tid).or_insert(0) += 1;
        }
    }
    counts
}

/// Shared by documents and queries so identical token bags get identical vectors.
fn weigh(weighting: Weighting, idf: &[f64], counts: HashMap<TermId, u32>) -> WeightVector {
    let entries = counts
        .into_iter()
        .map(|(tid, tf)| (tid, tf as f64 * idf[tid as usize]))
        .collect();
    let mut vector = WeightVector::new(idf.len(), entries);
    if weighting.l2_normalize {
        let norm = vector.l2_norm();
        if norm > 0.0 {
            vector.scale(1.0 / norm);
        }
    }
    vector
}

impl Index {
    /// Projects already-processed query text into this index's term space.
    /// Unknown terms are dropped and idf is never recomputed.
    pub fn project_query(&self, processed_text: &str) -> QueryVector {
        let counts = term_counts(&self.vocabulary, processed_text);
        weigh(self.weighting, &self.idf, counts)
    }

    /// Tabular view of the weights for inspection.
    pub fn term_matrix(&self, top_n: usize) -> TermMatrix {
        let top_n = top_n.min(self.vocabulary.len());
        let documents = self
            .vectors
            .iter()
            .enumerate()
            .map(|(doc_index, vector)| {
                let mut weights: Vec<(TermId, f64)> = vector.iter().collect();
                weights.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
                let top_terms = weights
                    .into_iter()
                    .take(top_n)
                    .filter_map(|(tid, weight)| {
                        self.vocabulary.term(tid).map(|term| TermWeight { term: term.to_string(), weight })
                    })
                    .collect();
                DocumentTerms { doc_index, top_terms }
            })
            .collect();
        let matrix = self
            .vectors
            .iter()
            .map(|v| (0..top_n as TermId).map(|tid| v.get(tid)).collect())
            .collect();
        TermMatrix {
            num_documents: self.documents.len(),
            num_terms: self.vocabulary.len(),
            terms: self.vocabulary.terms()[..top_n].to_vec(),
            documents,
            matrix,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermWeight {
    pub term: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentTerms {
    pub doc_index: DocId,
    pub top_terms: Vec<TermWeight>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermMatrix {
    pub num_documents: usize,
    pub num_terms: usize,
    pub terms: Vec<String>,
    pub documents: Vec<DocumentTerms>,
    pub matrix: Vec<Vec<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> ProcessedDocument {
        let tokens: Vec<String> = text.split_whitespace().map(String::from).collect();
        ProcessedDocument {
            filename: format!("{text}.txt"),
            path: String::new(),
            original_text: text.to_string(),
            processed_text: text.to_string(),
            word_count: tokens.len(),
            tokens,
        }
    }

    fn corpus() -> Vec<ProcessedDocument> {
        vec![doc("kucing makan ikan"), doc("anjing makan daging"), doc("kucing anjing main")]
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let err = VectorIndexer::default().build_index(vec![]).unwrap_err();
        assert!(matches!(err, EngineError::EmptyCorpus));
    }

    #[test]
    fn all_empty_documents_have_no_vocabulary() {
        let err = VectorIndexer::default().build_index(vec![doc(""), doc("")]).unwrap_err();
        assert!(matches!(err, EngineError::IndexingFailure(_)));
    }

    #[test]
    fn smoothed_idf_values() {
        let index = VectorIndexer::default().build_index(corpus()).unwrap();
        let v = index.vocabulary();
        assert_eq!(v.terms(), &["anjing", "daging", "ikan", "kucing", "main", "makan"]);
        let common = index.idf(v.position("makan").unwrap()).unwrap();
        let rare = index.idf(v.position("ikan").unwrap()).unwrap();
        assert!((common - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((rare - (2.0f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn raw_weights_without_normalization() {
        let weighting = Weighting { smooth_idf: false, l2_normalize: false };
        let index = VectorIndexer::new(weighting).build_index(corpus()).unwrap();
        let v = index.vocabulary();
        let d0 = index.vector(0).unwrap();
        assert!((d0.get(v.position("ikan").unwrap()) - 3.0f64.ln()).abs() < 1e-12);
        assert!((d0.get(v.position("makan").unwrap()) - 1.5f64.ln()).abs() < 1e-12);
        assert_eq!(d0.get(v.position("anjing").unwrap()), 0.0);
    }

    #[test]
    fn vectors_are_unit_length_and_share_dimension() {
        let index = VectorIndexer::default().build_index(corpus()).unwrap();
        for vector in index.vectors() {
            assert_eq!(vector.dim(), index.vocabulary().len());
            assert!((vector.l2_norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn query_projection_drops_unknown_terms() {
        let index = VectorIndexer::default().build_index(corpus()).unwrap();
        let q = index.project_query("kucing zebra zebra");
        assert_eq!(q.dim(), index.vocabulary().len());
        assert_eq!(q.nnz(), 1);
        assert!((q.get(index.vocabulary().position("kucing").unwrap()) - 1.0).abs() < 1e-12);
        assert!(index.project_query("").is_zero());
        assert!(index.project_query("zebra").is_zero());
    }

    #[test]
    fn rebuild_yields_independent_index() {
        let indexer = VectorIndexer::default();
        let first = indexer.build_index(corpus()).unwrap();
        let second = indexer.build_index(vec![doc("burung terbang")]).unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 1);
        assert_eq!(first.vocabulary().len(), 6);
        assert_eq!(second.vocabulary().terms(), &["burung", "terbang"]);
    }

    #[test]
    fn identical_input_gives_identical_positions() {
        let a = VectorIndexer::default().build_index(corpus()).unwrap();
        let b = VectorIndexer::default().build_index(corpus()).unwrap();
        assert_eq!(a.vocabulary(), b.vocabulary());
        assert_eq!(a.vectors(), b.vectors());
    }

    #[test]
    fn term_matrix_view() {
        let index = VectorIndexer::default().build_index(corpus()).unwrap();
        let m = index.term_matrix(50);
        assert_eq!(m.num_documents, 3);
        assert_eq!(m.num_terms, 6);
        assert_eq!(m.terms.len(), 6);
        assert_eq!(m.matrix[0].len(), 6);
        // rarest term of doc 0 weighs the most
        assert_eq!(m.documents[0].top_terms[0].term, "ikan");
        assert_eq!(m.documents[0].top_terms.len(), 3);

        let small = index.term_matrix(2);
        assert_eq!(small.terms, vec!["anjing", "daging"]);
        assert_eq!(small.documents[0].top_terms.len(), 2);
        assert_eq!(small.matrix[0], vec![0.0, 0.0]);
    }
}
