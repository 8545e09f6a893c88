//! Query service: the online retrieval path.
//!
//! A query is validated, embedded, looked up in the index, filtered by the
//! distance threshold, and mapped to [`SearchResult`]s. Anything that goes
//! wrong after validation is logged here and reported to the caller as
//! [`RagError::InternalSearch`], which carries no detail.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::config::RagConfig;
use crate::document::{Match, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Message returned for empty or whitespace-only queries.
pub const EMPTY_QUERY_MESSAGE: &str = "Query cannot be empty.";

/// Stateless semantic search over a shared, read-only index.
///
/// Build it once at startup and share it behind an `Arc`.
pub struct QueryService {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl QueryService {
    /// Create a service over an already built index.
    pub fn new(
        config: RagConfig,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            config,
            embedding_provider,
            vector_store,
        }
    }

    /// Retrieval settings in effect.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// The index queries are answered from.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Search the index for documents close to `query`.
    ///
    /// Returns at most `top_k` results in ascending distance order, none of
    /// them farther than `similarity_threshold`. An empty result is not an error.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidQuery`] if `query` is empty after trimming.
    /// - [`RagError::InternalSearch`] for any embedding or index failure.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            debug!("rejected empty query");
            return Err(RagError::InvalidQuery(EMPTY_QUERY_MESSAGE.to_string()));
        }

        let started = Instant::now();
        match self.retrieve(query).await {
            Ok(results) => {
                info!(
                    result_count = results.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "query completed"
                );
                Ok(results)
            }
            Err(e) => {
                error!(error = %e, "Error during search");
                Err(RagError::InternalSearch)
            }
        }
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedding_provider.embed(query).await?;
        let top_k = self.config.top_k;
        let matches = self.vector_store.search(&query_embedding, top_k).await?;
        debug!(candidates = matches.len(), "index returned candidates");
        Ok(filter_matches(matches, self.config.similarity_threshold))
    }
}

/// Drop matches farther than `threshold` and convert the rest, keeping order.
///
/// Distances are rounded to four decimal places. NaN distances never pass.
pub fn filter_matches(matches: Vec<Match>, threshold: f32) -> Vec<SearchResult> {
    matches
        .into_iter()
        .filter(|m| m.distance <= threshold)
        .map(|m| SearchResult {
            content: m.document.content,
            metadata: m.document.metadata,
            similarity_score: round4(f64::from(m.distance)),
        })
        .collect()
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
