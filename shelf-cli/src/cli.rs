//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shelf_rag::config::{
    DEFAULT_EMBED_BATCH_SIZE, DEFAULT_INDEX_PATH, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K,
};
use shelf_rag::openai::DEFAULT_MODEL;
use shelf_rag::{DistanceMetric, IngestMode, RagConfig};
use shelf_server::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "shelf", version, about = "Semantic search over a reading list")]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "SHELF_LOG_JSON")]
    pub log_json: bool,

    #[command(flatten)]
    pub rag: RagArgs,

    #[command(flatten)]
    pub embedding: EmbeddingArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the index from a CSV file
    Ingest {
        /// CSV file with name, authors, favorite_quote, One_line_review, why_should_read columns
        #[arg(long, default_value = "data.csv")]
        csv: PathBuf,
    },
    /// Run a single query against the index and print the results as JSON
    Search { query: String },
    /// Serve the search endpoint over HTTP
    Serve {
        #[arg(long, env = "SHELF_HOST", default_value = "127.0.0.1")]
        host: String,

        #[arg(long, env = "SHELF_PORT", default_value_t = 8000)]
        port: u16,
    },
}

/// Retrieval and index settings.
#[derive(Args, Debug, Clone)]
pub struct RagArgs {
    /// Directory of the persisted index
    #[arg(
        long,
        global = true,
        env = "SHELF_INDEX_PATH",
        default_value = DEFAULT_INDEX_PATH
    )]
    pub index_path: PathBuf,

    /// Nearest neighbours fetched per query
    #[arg(
        long,
        global = true,
        env = "SHELF_TOP_K",
        default_value_t = DEFAULT_TOP_K
    )]
    pub top_k: usize,

    /// Maximum distance for a result to be returned
    #[arg(
        long,
        global = true,
        env = "SHELF_SIMILARITY_THRESHOLD",
        default_value_t = DEFAULT_SIMILARITY_THRESHOLD
    )]
    pub similarity_threshold: f32,

    /// What ingestion does with an existing index: replace or append
    #[arg(
        long,
        global = true,
        env = "SHELF_INGEST_MODE",
        default_value = "replace"
    )]
    pub ingest_mode: IngestMode,

    /// Distance metric for a new index: l2, cosine, or inner_product
    #[arg(
        long,
        global = true,
        env = "SHELF_DISTANCE_METRIC",
        default_value = "l2"
    )]
    pub distance_metric: DistanceMetric,

    /// Documents embedded per provider call during ingestion
    #[arg(
        long,
        global = true,
        env = "SHELF_EMBED_BATCH_SIZE",
        default_value_t = DEFAULT_EMBED_BATCH_SIZE
    )]
    pub embed_batch_size: usize,
}

impl RagArgs {
    pub fn to_config(&self) -> shelf_rag::Result<RagConfig> {
        RagConfig::builder()
            .index_path(self.index_path.clone())
            .top_k(self.top_k)
            .similarity_threshold(self.similarity_threshold)
            .ingest_mode(self.ingest_mode)
            .distance_metric(self.distance_metric)
            .embed_batch_size(self.embed_batch_size)
            .build()
    }
}

/// Embedding model settings. The API key is read from `OPENAI_API_KEY`.
#[derive(Args, Debug, Clone)]
pub struct EmbeddingArgs {
    /// Embedding model name
    #[arg(
        long,
        global = true,
        env = "SHELF_EMBEDDING_MODEL",
        default_value = DEFAULT_MODEL
    )]
    pub embedding_model: String,

    /// Requested embedding dimensions (model default when unset)
    #[arg(long, global = true, env = "SHELF_EMBEDDING_DIMENSIONS")]
    pub embedding_dimensions: Option<usize>,

    /// OpenAI-compatible API base URL
    #[arg(long, global = true, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,
}

impl Command {
    pub fn server_config(&self) -> Option<ServerConfig> {
        match self {
            Command::Serve { host, port } => Some(ServerConfig {
                host: host.clone(),
                port: *port,
            }),
            _ => None,
        }
    }
}
