//! Embedding index builder: the offline ingestion path.
//!
//! The [`IndexBuilder`] embeds normalized documents and writes them to a
//! [`VectorStore`]. All embeddings are computed before the store is touched,
//! so a failing embedding call aborts the run without writing anything.
//!
//! # Example
//!
//! ```rust,ignore
//! use shelf_rag::{IndexBuilder, RagConfig};
//!
//! let builder = IndexBuilder::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_store(Arc::new(store))
//!     .build()?;
//!
//! let report = builder.ingest_csv("data.csv").await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::{IngestMode, RagConfig};
use crate::document::{IndexedVector, NormalizedDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::record::read_documents;
use crate::vectorstore::VectorStore;

/// Summary of a finished ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Documents embedded and written in this run.
    pub documents: usize,
    /// How existing index content was treated.
    pub mode: IngestMode,
    /// Vectors in the index after the run.
    pub total_vectors: usize,
}

/// Embeds documents and persists them to the index.
///
/// Construct one via [`IndexBuilder::builder()`].
pub struct IndexBuilder {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl IndexBuilder {
    /// Create a new [`IndexBuilderBuilder`].
    pub fn builder() -> IndexBuilderBuilder {
        IndexBuilderBuilder::default()
    }

    /// Settings this builder ingests with.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Embed `documents` and write them to the store according to the
    /// configured [`IngestMode`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if any embedding call fails or the
    /// provider returns the wrong number of vectors; nothing is written in
    /// that case. Store failures are returned as the store reports them.
    pub async fn build(&self, documents: &[NormalizedDocument]) -> Result<IngestReport> {
        let embedder = &self.embedding_provider;
        let provider = embedder.name().to_string();
        let batch_size = self.config.embed_batch_size;
        let mut vectors = Vec::with_capacity(documents.len());

        for (batch_index, batch) in documents.chunks(batch_size).enumerate() {
            let texts: Vec<&str> = batch.iter().map(|d| d.content.as_str()).collect();
            debug!(batch_index, batch_size = texts.len(), "embedding batch");

            let embeddings = match embedder.embed_batch(&texts).await {
                Ok(embeddings) => embeddings,
                Err(e) => {
                    error!(batch_index, error = %e, "embedding failed during ingestion");
                    return Err(match e {
                        e @ RagError::EmbeddingError { .. } => e,
                        other => RagError::EmbeddingError {
                            provider,
                            message: other.to_string(),
                        },
                    });
                }
            };

            if embeddings.len() != batch.len() {
                error!(
                    batch_index,
                    expected = batch.len(),
                    got = embeddings.len(),
                    "embedding count mismatch"
                );
                return Err(RagError::EmbeddingError {
                    provider,
                    message: format!(
                        "expected {} embeddings, provider returned {}",
                        batch.len(),
                        embeddings.len()
                    ),
                });
            }

            let indexed = embeddings
                .into_iter()
                .zip(batch)
                .map(|(e, doc)| IndexedVector::new(e, doc.clone()));
            vectors.extend(indexed);
        }

        let mode = self.config.ingest_mode;
        let write = match mode {
            IngestMode::Replace => self.vector_store.replace(&vectors).await,
            IngestMode::Append => self.vector_store.add(&vectors).await,
        };
        if let Err(e) = write {
            error!(%mode, error = %e, "failed to write index");
            return Err(e);
        }

        let total_vectors = self.vector_store.len().await?;
        info!(documents = vectors.len(), %mode, total_vectors, "ingestion complete");

        Ok(IngestReport {
            documents: vectors.len(),
            mode,
            total_vectors,
        })
    }

    /// Read, normalize, and ingest a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingColumn`] if the file lacks a required header,
    /// plus any error from [`build`](Self::build).
    pub async fn ingest_csv(&self, path: impl AsRef<Path>) -> Result<IngestReport> {
        let documents = read_documents(path)?;
        self.build(&documents).await
    }
}

/// Builder for constructing an [`IndexBuilder`].
#[derive(Default)]
pub struct IndexBuilderBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
}

impl IndexBuilderBuilder {
    /// Set the configuration. Defaults to [`RagConfig::default()`].
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store to write into.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Build the [`IndexBuilder`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the provider or store is missing.
    pub fn build(self) -> Result<IndexBuilder> {
        let missing = |field: &str| RagError::ConfigError(format!("{field} is required"));
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| missing("embedding_provider"))?;
        let vector_store = self.vector_store.ok_or_else(|| missing("vector_store"))?;

        Ok(IndexBuilder {
            config: self.config.unwrap_or_default(),
            embedding_provider,
            vector_store,
        })
    }
}
