use std::io;
use std::sync::Arc;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Every failure the engine can report.
///
/// Cloneable so the pipeline can keep the error of a failed build in its
/// state while also returning it to the caller.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("corpus is empty, nothing to index")]
    EmptyCorpus,

    #[error("no index has been built yet")]
    NotIndexed,

    #[error("document {id} not found (index holds {total} documents)")]
    OutOfRange { id: usize, total: usize },

    #[error("indexing failed: {0}")]
    IndexingFailure(String),

    #[error("preprocessing failed for {filename}: {reason}")]
    PreprocessingFailure { filename: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(Arc<io::Error>),
}

impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        EngineError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Config(err.to_string())
    }
}

impl EngineError {
    /// Short machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::EmptyCorpus => "empty_corpus",
            EngineError::NotIndexed => "not_indexed",
            EngineError::OutOfRange { .. } => "out_of_range",
            EngineError::IndexingFailure(_) => "indexing_failure",
            EngineError::PreprocessingFailure { .. } => "preprocessing_failure",
            EngineError::Config(_) => "config",
            EngineError::Io(_) => "io",
        }
    }
}
