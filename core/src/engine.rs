use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::index::{DocId, DocumentSummary, Index, ProcessedDocument, QueryVector, RawDocument, SharedIndex};
use crate::pipeline::{IndexSummary, IndexingPipeline, PipelineState, ProgressSink};
use crate::preprocess::{Preprocessed, PreprocessingSteps, TextPreprocessor};
use crate::search::{SearchOutcome, SearchService};
use crate::vectorizer::{TermMatrix, VectorIndexer};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub state: &'static str,
    pub indexed: bool,
    pub total_documents: usize,
    pub vocabulary_size: usize,
    pub built_at: Option<String>,
    pub last_error: Option<String>,
}

/// Everything a caller needs, built once and shared by reference.
///
/// Holds exactly one published index. `reindex` calls are serialised by the
/// pipeline; reads never wait on a build in progress.
pub struct SearchEngine {
    config: EngineConfig,
    preprocessor: Arc<TextPreprocessor>,
    index: Arc<SharedIndex>,
    pipeline: IndexingPipeline,
    search: SearchService,
}

impl SearchEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let preprocessor = Arc::new(TextPreprocessor::from_config(&config));
        Ok(Self::with_preprocessor(config, preprocessor))
    }

    /// Uses a caller-supplied preprocessor, e.g. one with custom linguistic resources.
    pub fn with_preprocessor(config: EngineConfig, preprocessor: Arc<TextPreprocessor>) -> Self {
        let index = Arc::new(SharedIndex::new());
        let pipeline = IndexingPipeline::new(
            Arc::clone(&preprocessor),
            VectorIndexer::new(config.weighting),
            Arc::clone(&index),
            config.preview_chars,
        );
        let search = SearchService::new(Arc::clone(&preprocessor), Arc::clone(&index));
        Self { config, preprocessor, index, pipeline, search }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn preprocess(&self, text: &str) -> Preprocessed {
        self.preprocessor.preprocess(text)
    }

    pub fn preprocessing_steps(&self, text: &str) -> PreprocessingSteps {
        self.preprocessor.steps(text)
    }

    pub fn reindex<S>(&self, documents: Vec<RawDocument>, sink: &mut S) -> Result<IndexSummary>
    where
        S: ProgressSink + ?Sized,
    {
        self.pipeline.reindex(documents, sink)
    }

    pub fn search(&self, query_text: &str, requested_count: usize) -> Result<SearchOutcome> {
        self.search.search(query_text, requested_count)
    }

    pub fn project_query(&self, query_text: &str) -> Result<QueryVector> {
        self.search.project_query(query_text)
    }

    /// Snapshot of the published index, if any.
    pub fn current_index(&self) -> Option<Arc<Index>> {
        self.index.current()
    }

    pub fn document(&self, id: DocId) -> Result<ProcessedDocument> {
        match self.index.current() {
            Some(index) => index.document(id).cloned(),
            None => Err(EngineError::OutOfRange { id, total: 0 }),
        }
    }

    pub fn documents(&self) -> Vec<DocumentSummary> {
        self.index
            .current()
            .map(|index| index.summaries(self.config.preview_chars))
            .unwrap_or_default()
    }

    pub fn term_matrix(&self, top_n: usize) -> Result<TermMatrix> {
        let index = self.index.current().ok_or(EngineError::NotIndexed)?;
        Ok(index.term_matrix(top_n))
    }

    pub fn state(&self) -> PipelineState {
        self.pipeline.state()
    }

    pub fn status(&self) -> EngineStatus {
        let state = self.pipeline.state();
        let index = self.index.current();
        EngineStatus {
            state: state.name(),
            indexed: index.is_some(),
            total_documents: index.as_ref().map_or(0, |i| i.len()),
            vocabulary_size: index.as_ref().map_or(0, |i| i.vocabulary().len()),
            built_at: index.as_ref().map(|i| i.built_at()),
            last_error: match state {
                PipelineState::Failed(err) => Some(err.to_string()),
                _ => None,
            },
        }
    }
}
