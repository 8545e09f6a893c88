//! Subcommand implementations. Each one builds its collaborators once and
//! hands them to `shelf-rag`.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use shelf_rag::openai::OpenAIEmbeddingProvider;
use shelf_rag::{
    EmbeddingProvider, FileVectorStore, IndexBuilder, IngestMode, QueryService, RagConfig,
    VectorStore,
};
use shelf_server::{AppState, ServerConfig, run_server};
use tracing::info;

use crate::cli::EmbeddingArgs;

pub fn embedding_provider(args: &EmbeddingArgs) -> Arc<dyn EmbeddingProvider> {
    let mut provider = OpenAIEmbeddingProvider::from_env().with_model(&args.embedding_model);
    if let Some(dims) = args.embedding_dimensions {
        provider = provider.with_dimensions(dims);
    }
    if let Some(base_url) = &args.openai_base_url {
        provider = provider.with_base_url(base_url);
    }
    Arc::new(provider)
}

async fn open_store(config: &RagConfig) -> anyhow::Result<Arc<FileVectorStore>> {
    let path = &config.index_path;
    let store = FileVectorStore::open(path, config.distance_metric)
        .await
        .with_context(|| format!("failed to open index at {}", path.display()))?;
    Ok(Arc::new(store))
}

/// An empty store that never reads the previous index, so a stale or corrupt
/// file cannot block a rebuild.
fn fresh_store(config: &RagConfig) -> Arc<FileVectorStore> {
    let store = FileVectorStore::create(&config.index_path, config.distance_metric);
    Arc::new(store)
}

pub async fn ingest(
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    csv: &Path,
) -> anyhow::Result<()> {
    info!(
        csv = %csv.display(),
        index = %config.index_path.display(),
        mode = %config.ingest_mode,
        "starting ingestion"
    );
    let store = match config.ingest_mode {
        IngestMode::Replace => fresh_store(&config),
        IngestMode::Append => open_store(&config).await?,
    };
    let builder = IndexBuilder::builder()
        .config(config)
        .embedding_provider(embedder)
        .vector_store(store.clone())
        .build()?;

    let report = builder
        .ingest_csv(csv)
        .await
        .with_context(|| format!("ingestion of {} failed", csv.display()))?;

    println!(
        "Indexed {} documents into {} ({} mode, {} total)",
        report.documents,
        store.dir().display(),
        report.mode,
        report.total_vectors
    );
    Ok(())
}

async fn query_service(
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
) -> anyhow::Result<Arc<QueryService>> {
    let store = open_store(&config).await?;
    info!(
        documents = store.len().await?,
        metric = %store.metric().await,
        "index ready"
    );
    Ok(Arc::new(QueryService::new(config, embedder, store)))
}

pub async fn search(
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    query: &str,
) -> anyhow::Result<()> {
    let service = query_service(config, embedder).await?;
    let results = service.search(query).await?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

pub async fn serve(
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    server: ServerConfig,
) -> anyhow::Result<()> {
    let service = query_service(config, embedder).await?;
    run_server(server, AppState::new(service)).await
}
