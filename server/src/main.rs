use anyhow::Result;
use axum::Router;
use clap::Parser;
use docseek_core::ingest::read_folder;
use docseek_core::{EngineConfig, Language, ProgressEvent, SearchEngine};
use docseek_server::build_app;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// JSON engine config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured language (indonesian, english)
    #[arg(long)]
    language: Option<Language>,
    /// Folder to index before serving
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(language) = args.language {
        config.language = language;
    }
    let engine = Arc::new(SearchEngine::new(config)?);

    if let Some(dir) = &args.corpus {
        let docs = read_folder(dir)?;
        let mut log_progress = |event: ProgressEvent| {
            if let ProgressEvent::Processing { current, total, filename, .. } = &event {
                tracing::debug!(current, total, %filename, "processing");
            }
        };
        let summary = engine.reindex(docs, &mut log_progress)?;
        tracing::info!(num_docs = summary.total_documents, num_terms = summary.vocabulary_size, "startup corpus indexed");
    }

    let app: Router = build_app(engine);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
