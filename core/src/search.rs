use crate::error::{EngineError, Result};
use crate::index::{DocId, Index, QueryVector, SharedIndex};
use crate::preprocess::TextPreprocessor;
use crate::similarity::rank;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub document_id: DocId,
    pub filename: String,
    pub original_text: String,
    pub processed_text: String,
    pub word_count: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub query_processed: String,
    pub query_tokens: Vec<String>,
    /// Number of ranked documents before truncation.
    pub total_results: usize,
    pub results: Vec<SearchHit>,
}

/// Query path: preprocess, project, rank, truncate.
pub struct SearchService {
    preprocessor: Arc<TextPreprocessor>,
    index: Arc<SharedIndex>,
}

impl SearchService {
    pub fn new(preprocessor: Arc<TextPreprocessor>, index: Arc<SharedIndex>) -> Self {
        Self { preprocessor, index }
    }

    fn ready_index(&self) -> Result<Arc<Index>> {
        self.index.current().ok_or(EngineError::NotIndexed)
    }

    pub fn project_query(&self, query_text: &str) -> Result<QueryVector> {
        let index = self.ready_index()?;
        let processed = self.preprocessor.preprocess(query_text);
        Ok(index.project_query(&processed.processed_text))
    }

    /// Returns at most `requested_count` hits (clamped to at least one).
    pub fn search(&self, query_text: &str, requested_count: usize) -> Result<SearchOutcome> {
        let index = self.ready_index()?;
        Ok(search_index(&self.preprocessor, &index, query_text, requested_count))
    }
}

/// Runs one query against a specific index snapshot.
pub fn search_index(
    preprocessor: &TextPreprocessor,
    index: &Index,
    query_text: &str,
    requested_count: usize,
) -> SearchOutcome {
    let processed = preprocessor.preprocess(query_text);
    let query = index.project_query(&processed.processed_text);
    let ranked = rank(&query, index);
    let total_results = ranked.len();
    let k = requested_count.max(1);

    let results = ranked
        .into_iter()
        .take(k)
        .enumerate()
        .filter_map(|(i, (doc_id, score))| {
            let doc = index.documents().get(doc_id)?;
            Some(SearchHit {
                rank: i + 1,
                document_id: doc_id,
                filename: doc.filename.clone(),
                original_text: doc.original_text.clone(),
                processed_text: doc.processed_text.clone(),
                word_count: doc.word_count,
                score,
            })
        })
        .collect();

    tracing::debug!(query = query_text, total_results, k, "search");
    SearchOutcome {
        query_processed: processed.processed_text,
        query_tokens: processed.tokens,
        total_results,
        results,
    }
}
