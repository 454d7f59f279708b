//! Staged full reindex: `NotIndexed -> Reading -> Processing -> BuildingIndex
//! -> Ready`, with any stage able to end in `Failed`.
//!
//! A run either publishes a complete new [`Index`] or leaves the previously
//! published one untouched. There is no resume; a failed run is retried by
//! resubmitting the whole corpus.

use crate::error::{EngineError, Result};
use crate::index::{DocumentSummary, Index, RawDocument, SharedIndex};
use crate::preprocess::TextPreprocessor;
use crate::vectorizer::VectorIndexer;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ProgressEvent {
    Reading {
        message: String,
    },
    Discovered {
        total: usize,
        message: String,
    },
    Processing {
        current: usize,
        total: usize,
        percentage: f64,
        filename: String,
        message: String,
    },
    Building {
        message: String,
    },
    Complete {
        total_documents: usize,
        message: String,
        documents: Vec<DocumentSummary>,
    },
    Failed {
        error: String,
        kind: String,
    },
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Complete { .. } | ProgressEvent::Failed { .. })
    }
}

/// Receives progress events in the order they happen.
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(ProgressEvent),
{
    fn emit(&mut self, event: ProgressEvent) {
        self(event)
    }
}

impl ProgressSink for Vec<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        self.push(event)
    }
}

/// Discards every event.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&mut self, _event: ProgressEvent) {}
}

#[derive(Debug, Clone, Default)]
pub enum PipelineState {
    #[default]
    NotIndexed,
    Reading,
    Processing,
    BuildingIndex,
    Ready,
    Failed(EngineError),
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::NotIndexed => "not_indexed",
            PipelineState::Reading => "reading",
            PipelineState::Processing => "processing",
            PipelineState::BuildingIndex => "building_index",
            PipelineState::Ready => "ready",
            PipelineState::Failed(_) => "failed",
        }
    }
}

/// What a successful reindex committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSummary {
    pub total_documents: usize,
    pub vocabulary_size: usize,
    pub built_at: String,
    pub documents: Vec<DocumentSummary>,
}

pub struct IndexingPipeline {
    preprocessor: Arc<TextPreprocessor>,
    indexer: VectorIndexer,
    target: Arc<SharedIndex>,
    preview_chars: usize,
    build_slot: Mutex<()>,
    state: RwLock<PipelineState>,
}

impl IndexingPipeline {
    pub fn new(
        preprocessor: Arc<TextPreprocessor>,
        indexer: VectorIndexer,
        target: Arc<SharedIndex>,
        preview_chars: usize,
    ) -> Self {
        Self {
            preprocessor,
            indexer,
            target,
            preview_chars,
            build_slot: Mutex::new(()),
            state: RwLock::new(PipelineState::NotIndexed),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state.read().clone()
    }

    fn set_state(&self, state: PipelineState) {
        tracing::debug!(state = state.name(), "pipeline state");
        *self.state.write() = state;
    }

    /// Runs a full reindex, blocking while another one holds the build slot.
    ///
    /// The last event emitted is always `Complete` or `Failed`. `Complete` is
    /// emitted only after the new index is published.
    pub fn reindex<S>(&self, documents: Vec<RawDocument>, sink: &mut S) -> Result<IndexSummary>
    where
        S: ProgressSink + ?Sized,
    {
        let _slot = self.build_slot.lock();
        match self.run(documents, sink) {
            Ok(index) => {
                let index = self.target.publish(index);
                self.set_state(PipelineState::Ready);
                let summary = IndexSummary {
                    total_documents: index.len(),
                    vocabulary_size: index.vocabulary().len(),
                    built_at: index.built_at(),
                    documents: index.summaries(self.preview_chars),
                };
                tracing::info!(
                    num_docs = summary.total_documents,
                    num_terms = summary.vocabulary_size,
                    "index published"
                );
                sink.emit(ProgressEvent::Complete {
                    total_documents: summary.total_documents,
                    message: format!("indexed {} documents", summary.total_documents),
                    documents: summary.documents.clone(),
                });
                Ok(summary)
            }
            Err(err) => {
                tracing::warn!(error = %err, "reindex failed");
                self.set_state(PipelineState::Failed(err.clone()));
                sink.emit(ProgressEvent::Failed { error: err.to_string(), kind: err.kind().to_string() });
                Err(err)
            }
        }
    }

    fn run<S>(&self, documents: Vec<RawDocument>, sink: &mut S) -> Result<Index>
    where
        S: ProgressSink + ?Sized,
    {
        self.set_state(PipelineState::Reading);
        sink.emit(ProgressEvent::Reading { message: "reading documents".into() });
        if documents.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }

        let total = documents.len();
        sink.emit(ProgressEvent::Discovered { total, message: format!("found {total} documents") });

        self.set_state(PipelineState::Processing);
        let mut processed = Vec::with_capacity(total);
        for (i, raw) in documents.iter().enumerate() {
            let current = i + 1;
            sink.emit(ProgressEvent::Processing {
                current,
                total,
                percentage: current as f64 / total as f64 * 100.0,
                filename: raw.filename.clone(),
                message: format!("processing {} ({current}/{total})", raw.filename),
            });
            let doc = self.preprocessor.process_document(raw)?;
            tracing::debug!(filename = %doc.filename, word_count = doc.word_count, "document processed");
            processed.push(doc);
        }

        self.set_state(PipelineState::BuildingIndex);
        sink.emit(ProgressEvent::Building { message: "building tf-idf index".into() });
        self.indexer.build_index(processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn pipeline() -> (IndexingPipeline, Arc<SharedIndex>) {
        let config = EngineConfig::default();
        let shared = Arc::new(SharedIndex::new());
        let p = IndexingPipeline::new(
            Arc::new(TextPreprocessor::from_config(&config)),
            VectorIndexer::new(config.weighting),
            Arc::clone(&shared),
            config.preview_chars,
        );
        (p, shared)
    }

    fn raw(name: &str, text: &str) -> RawDocument {
        RawDocument::new(name, format!("/corpus/{name}"), text)
    }

    #[test]
    fn event_sequence_for_successful_build() {
        let (p, shared) = pipeline();
        let mut events: Vec<ProgressEvent> = Vec::new();
        let docs = vec![raw("a.txt", "kucing makan ikan"), raw("b.txt", "anjing makan daging")];
        let summary = p.reindex(docs, &mut events).unwrap();

        let stages: Vec<_> = events
            .iter()
            .map(|e| serde_json::to_value(e).unwrap()["stage"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(stages, ["reading", "discovered", "processing", "processing", "building", "complete"]);
        match &events[3] {
            ProgressEvent::Processing { current, total, percentage, filename, .. } => {
                assert_eq!((*current, *total), (2, 2));
                assert_eq!(*percentage, 100.0);
                assert_eq!(filename, "b.txt");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(summary.total_documents, 2);
        assert_eq!(summary.documents[1].filename, "b.txt");
        assert!(matches!(p.state(), PipelineState::Ready));
        assert_eq!(shared.current().unwrap().len(), 2);
    }

    #[test]
    fn empty_corpus_fails_after_reading() {
        let (p, shared) = pipeline();
        let mut events: Vec<ProgressEvent> = Vec::new();
        let err = p.reindex(vec![], &mut events).unwrap_err();
        assert!(matches!(err, EngineError::EmptyCorpus));
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ProgressEvent::Reading { .. }));
        assert!(matches!(&events[1], ProgressEvent::Failed { kind, .. } if kind == "empty_corpus"));
        assert!(matches!(p.state(), PipelineState::Failed(EngineError::EmptyCorpus)));
        assert!(shared.current().is_none());
    }

    #[test]
    fn failure_keeps_previous_index() {
        let (p, shared) = pipeline();
        p.reindex(vec![raw("a.txt", "kucing makan ikan")], &mut NoProgress).unwrap();
        let before = shared.current().unwrap();

        let mut events: Vec<ProgressEvent> = Vec::new();
        let docs = vec![raw("ok.txt", "burung terbang"), raw("bad.bin", "\0\0binary")];
        let err = p.reindex(docs, &mut events).unwrap_err();
        assert!(matches!(err, EngineError::PreprocessingFailure { .. }));
        assert!(events.last().unwrap().is_terminal());
        assert!(Arc::ptr_eq(&before, &shared.current().unwrap()));
        assert!(matches!(p.state(), PipelineState::Failed(_)));
    }

    #[test]
    fn closures_are_sinks() {
        let (p, _shared) = pipeline();
        let mut count = 0usize;
        let mut sink = |_e: ProgressEvent| count += 1;
        p.reindex(vec![raw("a.txt", "kucing")], &mut sink).unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn progress_event_json_shape() {
        let e = ProgressEvent::Processing {
            current: 1,
            total: 4,
            percentage: 25.0,
            filename: "a.txt".into(),
            message: "processing a.txt (1/4)".into(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["stage"], "processing");
        assert_eq!(json["current"], 1);
        assert_eq!(json["total"], 4);
        assert_eq!(json["percentage"], 25.0);
    }
}
