use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docseek_core::ingest::read_folder;
use docseek_core::{EngineConfig, Language, ProgressEvent, SearchEngine};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Index a folder of text documents in memory and query it", long_about = None)]
struct Cli {
    /// JSON engine config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the configured language (indonesian, english)
    #[arg(long, global = true)]
    language: Option<Language>,
    /// Use ln(N/df) instead of the smoothed idf
    #[arg(long, global = true, default_value_t = false)]
    plain_idf: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a folder and print the ranked results for a query as JSON
    Search {
        /// Folder of .txt/.md documents
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = 10)]
        k: usize,
    },
    /// Index a folder and print the tf-idf term matrix as JSON
    Matrix {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 50)]
        top_n: usize,
    },
    /// Print every preprocessing stage for a piece of text
    Preprocess {
        #[arg(long)]
        text: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let engine = SearchEngine::new(load_config(&cli)?)?;

    match cli.command {
        Commands::Search { input, query, k } => {
            index_folder(&engine, &input)?;
            print_json(&engine.search(&query, k)?)
        }
        Commands::Matrix { input, top_n } => {
            index_folder(&engine, &input)?;
            print_json(&engine.term_matrix(top_n)?)
        }
        Commands::Preprocess { text } => print_json(&engine.preprocessing_steps(&text)),
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(language) = cli.language {
        config.language = language;
    }
    if cli.plain_idf {
        config.weighting.smooth_idf = false;
    }
    Ok(config)
}

fn index_folder(engine: &SearchEngine, input: &Path) -> Result<()> {
    let docs = read_folder(input).with_context(|| format!("reading {}", input.display()))?;
    let mut log_progress = |event: ProgressEvent| match &event {
        ProgressEvent::Processing { current, total, filename, .. } => {
            tracing::debug!(current, total, %filename, "processing")
        }
        ProgressEvent::Discovered { total, .. } => tracing::info!(total, "documents discovered"),
        ProgressEvent::Failed { error, .. } => tracing::warn!(%error, "indexing failed"),
        _ => {}
    };
    let summary = engine.reindex(docs, &mut log_progress)?;
    tracing::info!(num_docs = summary.total_documents, num_terms = summary.vocabulary_size, "index build complete");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
