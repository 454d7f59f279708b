use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Indonesian,
    English,
}

impl FromStr for Language {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "id" | "indonesian" => Ok(Language::Indonesian),
            "en" | "english" => Ok(Language::English),
            other => Err(EngineError::Config(format!("unsupported language '{other}'"))),
        }
    }
}

/// How term weights are computed from raw counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weighting {
    /// Use idf = ln((1 + N) / (1 + df)) + 1 instead of ln(N / df).
    pub smooth_idf: bool,
    /// Scale every document and query vector to unit Euclidean length.
    pub l2_normalize: bool,
}

impl Default for Weighting {
    fn default() -> Self {
        Self { smooth_idf: true, l2_normalize: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub language: Language,
    /// Tokens with fewer characters than this are dropped before stopword removal.
    pub min_token_len: usize,
    pub weighting: Weighting,
    /// Length of the text previews in progress events and document listings.
    pub preview_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            min_token_len: 2,
            weighting: Weighting::default(),
            preview_chars: 200,
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path.as_ref())?;
        let config: EngineConfig = serde_json::from_reader(BufReader::new(f))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_token_len == 0 {
            return Err(EngineError::Config("min_token_len must be at least 1".into()));
        }
        Ok(())
    }
}
