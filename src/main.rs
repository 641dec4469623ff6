use clap::Parser;
use neuradb::application::ingest::{AddManyOptions, IngestSummary};
use neuradb::application::search::{SearchOptions, SearchQuery};
use neuradb::cli::commands::{Cli, Commands};
use neuradb::config::NeuraDbConfig;
use neuradb::domain::values::metadata_filter::MetadataFilter;
use neuradb::domain::values::similarity_method::SimilarityMethod;
use neuradb::infrastructure::import::load_documents;
use neuradb::NeuraDb;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match NeuraDbConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error reading configuration: {e}");
            std::process::exit(1);
        }
    };

    let db = match NeuraDb::with_config(config.clone()) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error initializing NeuraDb: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(db, config, cli.command).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(
    db: NeuraDb,
    config: NeuraDbConfig,
    cmd: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Ingest {
            file,
            embed,
            batch_size,
        } => {
            let summary = ingest(&db, &file, embed, batch_size).await?;
            let report = serde_json::json!({
                "summary": summary,
                "stats": db.stats(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Search {
            file,
            query,
            vector,
            limit,
            threshold,
            method,
            filter,
            embed,
        } => {
            let method: SimilarityMethod = method.parse().map_err(|e: String| e)?;
            let mut options = SearchOptions::default().limit(limit).method(method);
            if let Some(t) = threshold {
                options = options.threshold(t);
            }
            if let Some(raw) = filter {
                options = options.filter(MetadataFilter::from_json(serde_json::from_str(&raw)?)?);
            }
            let query = match (vector, query) {
                (Some(raw), _) => SearchQuery::Vector(serde_json::from_str(&raw)?),
                (None, Some(text)) => SearchQuery::Text(text),
                (None, None) => return Err("either a query or --vector is required".into()),
            };

            let summary = ingest(&db, &file, embed, None).await?;
            if !summary.failed.is_empty() {
                tracing::warn!(failed = summary.failed.len(), "some documents were not loaded");
            }

            let results = db.search(query, options).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Config => {
            let report = serde_json::json!({
                "provider": format!("{:?}", config.provider),
                "embedding_model": db.embedding_model(),
                "default_batch_size": config.default_batch_size,
                "max_concurrency": config.max_concurrency,
                "embed_batch_limit": config.embed_batch_limit,
                "max_attempts": config.retry.max_attempts,
                "retry_base_ms": config.retry.base_delay.as_millis() as u64,
                "retry_max_ms": config.retry.max_delay.as_millis() as u64,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

async fn ingest(
    db: &NeuraDb,
    file: &Path,
    embed: bool,
    batch_size: Option<usize>,
) -> Result<IngestSummary, Box<dyn std::error::Error>> {
    let documents = load_documents(file)?;
    let mut options = AddManyOptions::default().on_progress(|processed, total| {
        tracing::info!(processed, total, "ingestion progress");
    });
    if embed {
        options = options.with_embeddings();
    }
    if let Some(size) = batch_size {
        options = options.batch_size(size);
    }
    Ok(db.add_documents(documents, options).await?)
}
