//! Directory-backed vector store.
//!
//! [`FileVectorStore`] keeps the whole index in memory and mirrors it to a
//! single `index.json` file inside its directory. Every write goes to a
//! temporary file first and is renamed into place, so readers never observe a
//! half-written index.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::document::{IndexedVector, Match};
use crate::error::{RagError, Result};
use crate::vectorstore::{DistanceMetric, VectorStore, check_dimensions, nearest};

const BACKEND: &str = "File";

/// Name of the index file inside the store directory.
pub const INDEX_FILE: &str = "index.json";

/// On-disk format version.
const FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct IndexFile {
    version: u32,
    metric: DistanceMetric,
    dimensions: Option<usize>,
    created_at: DateTime<Utc>,
    entries: Vec<IndexedVector>,
}

#[derive(Serialize)]
struct IndexFileRef<'a> {
    version: u32,
    metric: DistanceMetric,
    dimensions: Option<usize>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    entries: &'a [IndexedVector],
}

#[derive(Debug)]
struct State {
    metric: DistanceMetric,
    dimensions: Option<usize>,
    created_at: DateTime<Utc>,
    vectors: Vec<IndexedVector>,
}

impl State {
    fn empty(metric: DistanceMetric) -> Self {
        Self {
            metric,
            dimensions: None,
            created_at: Utc::now(),
            vectors: Vec::new(),
        }
    }
}

/// A persistent vector store rooted at a directory.
///
/// The metric passed at construction is the configured one. An existing index
/// keeps the metric it was built with until [`VectorStore::replace`] rebuilds
/// it, at which point the configured metric takes over.
///
/// # Example
///
/// ```rust,ignore
/// use shelf_rag::{DistanceMetric, FileVectorStore, VectorStore};
///
/// let store = FileVectorStore::open("./shelf_index", DistanceMetric::L2).await?;
/// let matches = store.search(&query_embedding, 3).await?;
/// ```
#[derive(Debug)]
pub struct FileVectorStore {
    dir: PathBuf,
    configured: DistanceMetric,
    state: RwLock<State>,
}

impl FileVectorStore {
    /// Open the store at `dir`, loading any existing index.
    ///
    /// A missing directory or index file yields an empty store; nothing is
    /// written until the first mutation. An existing file keeps the metric it
    /// was built with.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexError`] if the index file cannot be read or parsed,
    /// or was written by an incompatible format version.
    pub async fn open(dir: impl AsRef<Path>, metric: DistanceMetric) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(INDEX_FILE);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "no index found, starting empty");
                return Ok(Self::create(dir, metric));
            }
            Err(e) => {
                let message = format!("failed to read {}: {e}", path.display());
                return Err(RagError::index(BACKEND, message));
            }
        };

        let file: IndexFile = match serde_json::from_slice(&bytes) {
            Ok(file) => file,
            Err(e) => {
                let message = format!("failed to parse {}: {e}", path.display());
                return Err(RagError::index(BACKEND, message));
            }
        };

        if file.version != FORMAT_VERSION {
            let message = format!(
                "unsupported index version {} (expected {FORMAT_VERSION})",
                file.version
            );
            return Err(RagError::index(BACKEND, message));
        }
        let dimensions = check_dimensions(BACKEND, file.dimensions, &file.entries)?;

        if file.metric != metric {
            warn!(
                configured = %metric,
                stored = %file.metric,
                "index was built with a different metric, using stored metric until rebuilt"
            );
        }

        info!(
            path = %path.display(),
            vector_count = file.entries.len(),
            metric = %file.metric,
            "loaded index"
        );

        Ok(Self {
            dir,
            configured: metric,
            state: RwLock::new(State {
                metric: file.metric,
                dimensions,
                created_at: file.created_at,
                vectors: file.entries,
            }),
        })
    }

    /// Create an empty store at `dir` without reading what is already there.
    ///
    /// Any existing index file is left alone until the first mutation
    /// overwrites it.
    pub fn create(dir: impl AsRef<Path>, metric: DistanceMetric) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            configured: metric,
            state: RwLock::new(State::empty(metric)),
        }
    }

    /// Directory holding the index.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Metric in effect for this index.
    pub async fn metric(&self) -> DistanceMetric {
        self.state.read().await.metric
    }

    async fn persist(&self, state: &State) -> Result<()> {
        let io_err = |action: &str, e: std::io::Error| {
            RagError::index(BACKEND, format!("failed to {action}: {e}"))
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_err(&format!("create {}", self.dir.display()), e))?;

        let body = IndexFileRef {
            version: FORMAT_VERSION,
            metric: state.metric,
            dimensions: state.dimensions,
            created_at: state.created_at,
            updated_at: Utc::now(),
            entries: &state.vectors,
        };
        let bytes = serde_json::to_vec(&body)
            .map_err(|e| io_err("serialize index", e.into()))?;

        let path = self.dir.join(INDEX_FILE);
        let tmp = self.dir.join(format!("{INDEX_FILE}.tmp"));
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| io_err("write index", e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_err("move index into place", e))?;

        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            vector_count = state.vectors.len(),
            "index persisted"
        );
        Ok(())
    }
}

#[async_trait]
impl VectorStore for FileVectorStore {
    async fn add(&self, vectors: &[IndexedVector]) -> Result<()> {
        let mut state = self.state.write().await;
        let previous = (state.dimensions, state.vectors.len());

        state.dimensions = check_dimensions(BACKEND, state.dimensions, vectors)?;
        state.vectors.extend_from_slice(vectors);

        if let Err(e) = self.persist(&state).await {
            state.dimensions = previous.0;
            state.vectors.truncate(previous.1);
            return Err(e);
        }
        Ok(())
    }

    async fn replace(&self, vectors: &[IndexedVector]) -> Result<()> {
        let dimensions = check_dimensions(BACKEND, None, vectors)?;
        let next = State {
            metric: self.configured,
            dimensions,
            created_at: Utc::now(),
            vectors: vectors.to_vec(),
        };
        let mut state = self.state.write().await;
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.replace(&[]).await
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<Match>> {
        let state = self.state.read().await;
        if let Some(d) = state.dimensions {
            if d != query.len() {
                return Err(RagError::index(
                    BACKEND,
                    format!("query has dimension {}, index expects {d}", query.len()),
                ));
            }
        }
        Ok(nearest(state.metric, &state.vectors, query, k))
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.state.read().await.vectors.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentMetadata, NormalizedDocument};

    fn vector(title: &str, embedding: Vec<f32>) -> IndexedVector {
        IndexedVector::new(
            embedding,
            NormalizedDocument {
                content: format!("Title: {title}"),
                metadata: DocumentMetadata {
                    title: title.into(),
                    author: "anon".into(),
                },
            },
        )
    }

    #[tokio::test]
    async fn missing_directory_opens_empty_without_writing() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("index");
        let store = FileVectorStore::open(&dir, DistanceMetric::L2)
            .await
            .unwrap();

        assert_eq!(store.len().await.unwrap(), 0);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn add_survives_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileVectorStore::open(temp.path(), DistanceMetric::L2)
            .await
            .unwrap();
        store.add(&[vector("Dune", vec![1.0, 0.0])]).await.unwrap();
        store.add(&[vector("Emma", vec![0.0, 1.0])]).await.unwrap();

        let reopened = FileVectorStore::open(temp.path(), DistanceMetric::L2)
            .await
            .unwrap();
        assert_eq!(reopened.len().await.unwrap(), 2);
        let matches = reopened.search(&[0.0, 1.0], 1).await.unwrap();
        assert_eq!(matches[0].document.metadata.title, "Emma");
        assert!(!temp.path().join(format!("{INDEX_FILE}.tmp")).exists());
    }

    #[tokio::test]
    async fn replace_overwrites_persisted_content() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileVectorStore::open(temp.path(), DistanceMetric::L2)
            .await
            .unwrap();
        store.add(&[vector("old", vec![1.0, 0.0])]).await.unwrap();
        store
            .replace(&[vector("new", vec![0.0, 0.0, 1.0])])
            .await
            .unwrap();

        let reopened = FileVectorStore::open(temp.path(), DistanceMetric::L2)
            .await
            .unwrap();
        assert_eq!(reopened.len().await.unwrap(), 1);
        let matches = reopened.search(&[0.0, 0.0, 1.0], 3).await.unwrap();
        assert_eq!(matches[0].document.metadata.title, "new");
    }

    #[tokio::test]
    async fn stored_metric_wins_over_configured() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileVectorStore::open(temp.path(), DistanceMetric::Cosine)
            .await
            .unwrap();
        store.add(&[vector("a", vec![1.0, 0.0])]).await.unwrap();

        let reopened = FileVectorStore::open(temp.path(), DistanceMetric::L2)
            .await
            .unwrap();
        assert_eq!(reopened.metric().await, DistanceMetric::Cosine);
    }

    #[tokio::test]
    async fn replace_rebuilds_with_configured_metric() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileVectorStore::open(temp.path(), DistanceMetric::L2)
            .await
            .unwrap();
        store.add(&[vector("a", vec![3.0, 0.0])]).await.unwrap();

        let rebuilt = FileVectorStore::open(temp.path(), DistanceMetric::Cosine)
            .await
            .unwrap();
        rebuilt
            .replace(&[vector("b", vec![3.0, 0.0])])
            .await
            .unwrap();
        assert_eq!(rebuilt.metric().await, DistanceMetric::Cosine);

        let reopened = FileVectorStore::open(temp.path(), DistanceMetric::L2)
            .await
            .unwrap();
        assert_eq!(reopened.metric().await, DistanceMetric::Cosine);
        let matches = reopened.search(&[1.0, 0.0], 1).await.unwrap();
        assert!(matches[0].distance.abs() < 1e-6);
    }

    #[tokio::test]
    async fn append_keeps_stored_metric() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileVectorStore::open(temp.path(), DistanceMetric::L2)
            .await
            .unwrap();
        store.add(&[vector("a", vec![1.0, 0.0])]).await.unwrap();

        let appended = FileVectorStore::open(temp.path(), DistanceMetric::Cosine)
            .await
            .unwrap();
        appended.add(&[vector("b", vec![0.0, 1.0])]).await.unwrap();

        let reopened = FileVectorStore::open(temp.path(), DistanceMetric::Cosine)
            .await
            .unwrap();
        assert_eq!(reopened.metric().await, DistanceMetric::L2);
        assert_eq!(reopened.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn create_ignores_corrupt_file_and_replace_overwrites_it() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join(INDEX_FILE), b"{not json").unwrap();

        let store = FileVectorStore::create(temp.path(), DistanceMetric::L2);
        assert!(store.is_empty().await.unwrap());
        store
            .replace(&[vector("a", vec![1.0, 0.0])])
            .await
            .unwrap();

        let reopened = FileVectorStore::open(temp.path(), DistanceMetric::L2)
            .await
            .unwrap();
        assert_eq!(reopened.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn dimension_mismatch_leaves_index_untouched() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileVectorStore::open(temp.path(), DistanceMetric::L2)
            .await
            .unwrap();
        store.add(&[vector("a", vec![1.0, 0.0])]).await.unwrap();

        let err = store
            .add(&[vector("b", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::IndexError { .. }));
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn dimensions_are_inferred_when_file_omits_them() {
        let temp = tempfile::tempdir().unwrap();
        let source = FileVectorStore::create(temp.path(), DistanceMetric::L2);
        source.add(&[vector("a", vec![1.0, 0.0])]).await.unwrap();

        let path = temp.path().join(INDEX_FILE);
        let mut raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        raw["dimensions"] = serde_json::Value::Null;
        std::fs::write(&path, serde_json::to_vec(&raw).unwrap()).unwrap();

        let reopened = FileVectorStore::open(temp.path(), DistanceMetric::L2)
            .await
            .unwrap();
        let err = reopened.search(&[1.0, 0.0, 0.0], 1).await.unwrap_err();
        assert!(matches!(err, RagError::IndexError { .. }));
    }

    #[tokio::test]
    async fn corrupt_file_is_index_error() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join(INDEX_FILE), b"{not json").unwrap();
        let err = FileVectorStore::open(temp.path(), DistanceMetric::L2)
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::IndexError { .. }));
    }

    #[tokio::test]
    async fn unknown_version_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join(INDEX_FILE),
            br#"{"version":99,"metric":"l2","dimensions":null,"created_at":"2024-01-01T00:00:00Z","entries":[]}"#,
        )
        .unwrap();
        let err = FileVectorStore::open(temp.path(), DistanceMetric::L2)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unsupported index version 99"));
    }
}
