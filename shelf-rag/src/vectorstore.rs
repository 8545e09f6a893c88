//! Vector store trait and distance metrics for the embedding index.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{IndexedVector, Match};
use crate::error::{RagError, Result};

/// How distance between two embeddings is measured. Every metric is
/// lower-is-closer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Squared Euclidean distance.
    #[default]
    L2,
    /// `1 - cosine similarity`.
    Cosine,
    /// `1 - dot product`.
    InnerProduct,
}

impl DistanceMetric {
    /// Distance between `a` and `b`. Callers guarantee equal lengths.
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::L2 => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
            DistanceMetric::Cosine => {
                let norm_a = dot(a, a).sqrt();
                let norm_b = dot(b, b).sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 1.0;
                }
                1.0 - dot(a, b) / (norm_a * norm_b)
            }
            DistanceMetric::InnerProduct => 1.0 - dot(a, b),
        }
    }

    /// Name used in config and in the index file.
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceMetric::L2 => "l2",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::InnerProduct => "inner_product",
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "l2" => Ok(DistanceMetric::L2),
            "cosine" => Ok(DistanceMetric::Cosine),
            "ip" | "inner_product" => Ok(DistanceMetric::InnerProduct),
            other => Err(RagError::ConfigError(format!("unknown metric '{other}'"))),
        }
    }
}

/// The nearest-neighbour index that ingestion writes and queries read.
///
/// # Example
///
/// ```rust,ignore
/// use shelf_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.add(&vectors).await?;
/// let matches = store.search(&query_embedding, 3).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append vectors to the index.
    async fn add(&self, vectors: &[IndexedVector]) -> Result<()>;

    /// Replace the whole index content with `vectors`.
    async fn replace(&self, vectors: &[IndexedVector]) -> Result<()> {
        self.clear().await?;
        self.add(vectors).await
    }

    /// Remove every vector.
    async fn clear(&self) -> Result<()>;

    /// Return up to `k` nearest documents, ordered by ascending distance.
    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<Match>>;

    /// Number of vectors in the index.
    async fn len(&self) -> Result<usize>;

    /// Whether the index holds no vectors.
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

/// Check that every vector shares one dimension, and that it matches `expected`
/// when the index already has one. Returns the batch dimension.
pub(crate) fn check_dimensions(
    backend: &str,
    expected: Option<usize>,
    vectors: &[IndexedVector],
) -> Result<Option<usize>> {
    let mut dims = expected;
    for vector in vectors {
        let len = vector.embedding.len();
        match dims {
            Some(d) if d != len => {
                return Err(RagError::index(
                    backend,
                    format!(
                        "vector '{}' has dimension {len}, index expects {d}",
                        vector.id
                    ),
                ));
            }
            Some(_) => {}
            None => dims = Some(len),
        }
    }
    Ok(dims)
}

/// Brute-force scan shared by the in-process stores.
pub(crate) fn nearest(
    metric: DistanceMetric,
    entries: &[IndexedVector],
    query: &[f32],
    k: usize,
) -> Vec<Match> {
    let mut scored: Vec<(usize, f32)> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| (i, metric.distance(&entry.embedding, query)))
        .collect();

    scored.sort_by(|a, b| a.1.total_cmp(&b.1));
    scored.truncate(k);
    scored
        .into_iter()
        .map(|(i, distance)| Match {
            document: entries[i].document.clone(),
            distance,
        })
        .collect()
}
