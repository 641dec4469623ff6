use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "neuradb", about = "In-memory vector document store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load documents from a file and report the ingestion summary
    Ingest {
        /// JSON array or CSV file (id, content, metadata columns)
        file: PathBuf,
        /// Embed documents that carry no embedding
        #[arg(long)]
        embed: bool,
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Load documents from a file, then search them
    Search {
        file: PathBuf,
        /// Query text (embedded with the configured provider)
        #[arg(required_unless_present = "vector")]
        query: Option<String>,
        /// Query vector as a JSON array, e.g. "[1,0,0]"
        #[arg(long, conflicts_with = "query")]
        vector: Option<String>,
        #[arg(long, default_value = "10")]
        limit: usize,
        #[arg(long)]
        threshold: Option<f64>,
        /// Similarity method (cosine, euclidean, dot)
        #[arg(long, default_value = "cosine")]
        method: String,
        /// Metadata filter as a JSON object, e.g. '{"category":"tech"}'
        #[arg(long)]
        filter: Option<String>,
        /// Embed documents that carry no embedding
        #[arg(long)]
        embed: bool,
    },
    /// Show the embedding model and store defaults in effect
    Config,
}
