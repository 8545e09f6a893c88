//! # shelf-rag
//!
//! Semantic search over a reading list.
//!
//! Records are read from a CSV file, normalized into labelled text
//! ([`record`]), embedded and written to a persisted index ([`ingest`]), and
//! searched at request time by the [`QueryService`] ([`search`]). The embedding
//! model and the index sit behind the [`EmbeddingProvider`] and [`VectorStore`]
//! traits.
//!
//! ## Features
//!
//! - `openai`: [`openai::OpenAIEmbeddingProvider`] backed by the OpenAI embeddings API.

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod filestore;
pub mod ingest;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod record;
pub mod search;
pub mod vectorstore;

pub use config::{IngestMode, RagConfig, RagConfigBuilder};
pub use document::{
    DocumentMetadata, IndexedVector, Match, NormalizedDocument, SearchResult, SourceRecord,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use filestore::FileVectorStore;
pub use ingest::{IndexBuilder, IndexBuilderBuilder, IngestReport};
pub use inmemory::InMemoryVectorStore;
pub use record::{RecordReader, normalize, read_documents, read_records};
pub use search::QueryService;
pub use vectorstore::{DistanceMetric, VectorStore};
