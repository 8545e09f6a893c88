//! Configuration for ingestion and retrieval.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::vectorstore::DistanceMetric;

/// Default number of nearest neighbours fetched per query.
pub const DEFAULT_TOP_K: usize = 3;

/// Default maximum distance a result may have to be returned.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 1.4;

/// Default directory of the persisted index.
pub const DEFAULT_INDEX_PATH: &str = "./shelf_index";

/// Default number of documents embedded per provider call.
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 100;

/// What ingestion does with an index that already has content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestMode {
    /// Discard the existing content and write only the new vectors.
    #[default]
    Replace,
    /// Keep the existing content and add the new vectors after it.
    Append,
}

impl fmt::Display for IngestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IngestMode::Replace => "replace",
            IngestMode::Append => "append",
        })
    }
}

impl FromStr for IngestMode {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "replace" => Ok(IngestMode::Replace),
            "append" => Ok(IngestMode::Append),
            other => Err(RagError::ConfigError(format!(
                "unknown ingest mode '{other}' (expected 'replace' or 'append')"
            ))),
        }
    }
}

/// Configuration parameters shared by ingestion and the query service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Number of nearest neighbours fetched from the index per query.
    pub top_k: usize,
    /// Maximum distance for a result to be returned (results above are dropped).
    pub similarity_threshold: f32,
    /// Directory of the persisted index.
    pub index_path: PathBuf,
    /// Behaviour when ingesting into a non-empty index.
    pub ingest_mode: IngestMode,
    /// Metric used when a new index is created.
    pub distance_metric: DistanceMetric,
    /// Number of documents embedded per provider call during ingestion.
    pub embed_batch_size: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            ingest_mode: IngestMode::default(),
            distance_metric: DistanceMetric::default(),
            embed_batch_size: DEFAULT_EMBED_BATCH_SIZE,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the number of nearest neighbours fetched per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the maximum distance for returned results.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Set the index directory.
    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_path = path.into();
        self
    }

    /// Set what ingestion does with existing index content.
    pub fn ingest_mode(mut self, mode: IngestMode) -> Self {
        self.config.ingest_mode = mode;
        self
    }

    /// Set the metric for newly created indexes.
    pub fn distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.config.distance_metric = metric;
        self
    }

    /// Set the ingestion embedding batch size.
    pub fn embed_batch_size(mut self, size: usize) -> Self {
        self.config.embed_batch_size = size;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `top_k == 0`
    /// - `similarity_threshold` is negative or not finite
    /// - `embed_batch_size == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError(
                "top_k must be greater than zero".to_string(),
            ));
        }
        let threshold = self.config.similarity_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(RagError::ConfigError(format!(
                "similarity_threshold ({threshold}) must be a non-negative number"
            )));
        }
        if self.config.embed_batch_size == 0 {
            return Err(RagError::ConfigError(
                "embed_batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}
