//! Error types for the `shelf-rag` crate.

use thiserror::Error;

/// Errors that can occur while ingesting records or answering queries.
#[derive(Debug, Error)]
pub enum RagError {
    /// The query was rejected before any work was done.
    #[error("{0}")]
    InvalidQuery(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred reading or writing the embedding index.
    #[error("Index error ({backend}): {message}")]
    IndexError {
        /// The index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A required column is absent from the ingestion file header.
    #[error("Missing column '{column}' in input")]
    MissingColumn {
        /// The exact header name that was expected.
        column: String,
    },

    /// The search failed for a reason that is not reported to the caller.
    ///
    /// The underlying cause is logged where it happens.
    #[error("Internal Server Error: Something went wrong with the search engine.")]
    InternalSearch,

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The ingestion file could not be parsed.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// An I/O failure outside the index backend.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// Whether the error was caused by the caller's input rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, RagError::InvalidQuery(_))
    }

    pub(crate) fn index(backend: &str, message: impl Into<String>) -> Self {
        RagError::IndexError {
            backend: backend.to_string(),
            message: message.into(),
        }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
