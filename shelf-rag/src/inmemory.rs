//! In-memory vector store.
//!
//! [`InMemoryVectorStore`] keeps every vector in a `Vec` behind a
//! `tokio::sync::RwLock` and answers queries with a full scan. Nothing is
//! persisted; use [`FileVectorStore`](crate::FileVectorStore) for that.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{IndexedVector, Match};
use crate::error::{RagError, Result};
use crate::vectorstore::{DistanceMetric, VectorStore, check_dimensions, nearest};

const BACKEND: &str = "InMemory";

#[derive(Debug, Default)]
struct Entries {
    dimensions: Option<usize>,
    vectors: Vec<IndexedVector>,
}

/// A non-persistent vector store with brute-force nearest-neighbour search.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    metric: DistanceMetric,
    entries: RwLock<Entries>,
}

impl InMemoryVectorStore {
    /// Create an empty store using squared L2 distance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store using the given metric.
    pub fn with_metric(metric: DistanceMetric) -> Self {
        Self {
            metric,
            entries: RwLock::default(),
        }
    }

    /// Metric used to rank matches.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add(&self, vectors: &[IndexedVector]) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.dimensions = check_dimensions(BACKEND, entries.dimensions, vectors)?;
        entries.vectors.extend_from_slice(vectors);
        Ok(())
    }

    async fn replace(&self, vectors: &[IndexedVector]) -> Result<()> {
        let dimensions = check_dimensions(BACKEND, None, vectors)?;
        let mut entries = self.entries.write().await;
        *entries = Entries {
            dimensions,
            vectors: vectors.to_vec(),
        };
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.entries.write().await = Entries::default();
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<Match>> {
        let entries = self.entries.read().await;
        if let Some(d) = entries.dimensions {
            if d != query.len() {
                return Err(RagError::index(
                    BACKEND,
                    format!("query has dimension {}, index expects {d}", query.len()),
                ));
            }
        }
        Ok(nearest(self.metric, &entries.vectors, query, k))
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().await.vectors.len())
    }
}
