use crate::config::{EngineConfig, Language};
use crate::error::{EngineError, Result};
use crate::index::{ProcessedDocument, RawDocument};
use crate::stemmer::{IndonesianStemmer, SnowballStemmer, Stemmer};
use crate::stopwords::stopwords;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("valid regex");
}

/// Stopword set and stemmer for one language.
pub struct LinguisticResources {
    pub stopwords: HashSet<String>,
    pub stemmer: Box<dyn Stemmer>,
}

impl LinguisticResources {
    pub fn new(stopwords: HashSet<String>, stemmer: Box<dyn Stemmer>) -> Self {
        Self { stopwords, stemmer }
    }

    pub fn for_language(language: Language) -> Self {
        let words = stopwords(language).iter().map(|w| w.to_string()).collect();
        let stemmer: Box<dyn Stemmer> = match language {
            Language::Indonesian => Box::new(IndonesianStemmer::new()),
            Language::English => Box::new(SnowballStemmer::english()),
        };
        Self::new(words, stemmer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preprocessed {
    pub processed_text: String,
    pub tokens: Vec<String>,
}

/// Output of every stage, each joined by single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreprocessingSteps {
    pub original: String,
    pub case_folding: String,
    pub tokenizing: String,
    pub filtering: String,
    pub stopword_removal: String,
    pub stemming: String,
}

/// Turns raw text into the canonical token sequence shared by documents and
/// queries.
pub struct TextPreprocessor {
    resources: LinguisticResources,
    min_token_len: usize,
}

impl TextPreprocessor {
    pub fn new(resources: LinguisticResources, min_token_len: usize) -> Self {
        Self { resources, min_token_len: min_token_len.max(1) }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(LinguisticResources::for_language(config.language), config.min_token_len)
    }

    pub fn case_fold(&self, text: &str) -> String {
        text.nfkc().collect::<String>().to_lowercase()
    }

    pub fn tokenize(&self, folded: &str) -> Vec<String> {
        WORD.find_iter(folded).map(|m| m.as_str().to_string()).collect()
    }

    /// Drops empty tokens, digit-only tokens and tokens shorter than the minimum length.
    pub fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .filter(|t| !t.is_empty())
            .filter(|t| !t.chars().all(|c| c.is_numeric()))
            .filter(|t| t.chars().count() >= self.min_token_len)
            .collect()
    }

    pub fn remove_stopwords(&self, tokens: Vec<String>) -> Vec<String> {
        tokens.into_iter().filter(|t| !self.resources.stopwords.contains(t)).collect()
    }

    pub fn stem(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .map(|t| self.resources.stemmer.stem(&t))
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn preprocess(&self, text: &str) -> Preprocessed {
        let folded = self.case_fold(text);
        let tokens = self.stem(self.remove_stopwords(self.filter(self.tokenize(&folded))));
        Preprocessed { processed_text: tokens.join(" "), tokens }
    }

    pub fn steps(&self, text: &str) -> PreprocessingSteps {
        let case_folding = self.case_fold(text);
        let tokens = self.tokenize(&case_folding);
        let tokenizing = tokens.join(" ");
        let tokens = self.filter(tokens);
        let filtering = tokens.join(" ");
        let tokens = self.remove_stopwords(tokens);
        let stopword_removal = tokens.join(" ");
        let stemming = self.stem(tokens).join(" ");
        PreprocessingSteps {
            original: text.to_string(),
            case_folding,
            tokenizing,
            filtering,
            stopword_removal,
            stemming,
        }
    }

    /// Preprocess a corpus document. Text carrying NUL characters is binary
    /// content that slipped past extraction and is rejected.
    pub fn process_document(&self, raw: &RawDocument) -> Result<ProcessedDocument> {
        if raw.raw_text.contains('\0') {
            return Err(EngineError::PreprocessingFailure {
                filename: raw.filename.clone(),
                reason: "text contains NUL bytes (binary content?)".into(),
            });
        }
        let Preprocessed { processed_text, tokens } = self.preprocess(&raw.raw_text);
        Ok(ProcessedDocument {
            filename: raw.filename.clone(),
            path: raw.path.clone(),
            original_text: raw.raw_text.clone(),
            word_count: tokens.len(),
            processed_text,
            tokens,
        })
    }
}
