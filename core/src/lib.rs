pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod ingest;
pub mod pipeline;
pub mod preprocess;
pub mod search;
pub mod similarity;
pub mod stemmer;
pub mod stopwords;
pub mod vectorizer;

pub use config::{EngineConfig, Language, Weighting};
pub use engine::{EngineStatus, SearchEngine};
pub use error::{EngineError, Result};
pub use index::{DocId, DocumentSummary, Index, ProcessedDocument, QueryVector, RawDocument, TermId, Vocabulary, WeightVector};
pub use pipeline::{IndexSummary, NoProgress, PipelineState, ProgressEvent, ProgressSink};
pub use preprocess::{Preprocessed, PreprocessingSteps, TextPreprocessor};
pub use search::{SearchHit, SearchOutcome};
