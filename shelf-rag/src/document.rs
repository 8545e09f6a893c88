//! Data types for source records, indexed documents, and search results.

use serde::{Deserialize, Serialize};

/// One row of the reading list as it appears in the ingestion file.
///
/// Every field may be empty; a missing cell is read as an empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceRecord {
    /// Book title.
    pub name: String,
    /// Author or authors, as written in the source.
    pub authors: String,
    /// A quote from the book.
    pub favorite_quote: String,
    /// A single-sentence review.
    pub one_line_review: String,
    /// The reason to pick the book up.
    pub why_should_read: String,
}

/// Display metadata kept alongside each indexed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: String,
    pub author: String,
}

/// The text blob and metadata produced from a [`SourceRecord`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedDocument {
    /// The labelled text that gets embedded.
    pub content: String,
    /// Title and author for display.
    pub metadata: DocumentMetadata,
}

/// A [`NormalizedDocument`] paired with its embedding, as persisted in the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedVector {
    /// Unique identifier assigned at ingestion.
    pub id: String,
    /// The vector embedding of `document.content`.
    pub embedding: Vec<f32>,
    /// The document this vector was computed from.
    pub document: NormalizedDocument,
}

impl IndexedVector {
    /// Pair a document with its embedding under a fresh random id.
    pub fn new(embedding: Vec<f32>, document: NormalizedDocument) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            embedding,
            document,
        }
    }
}

/// A document returned by a [`VectorStore`](crate::VectorStore) search.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// The matched document.
    pub document: NormalizedDocument,
    /// Distance to the query vector (lower is closer).
    pub distance: f32,
}

/// A single hit returned by the query service.
///
/// `similarity_score` is a distance: lower means more similar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub content: String,
    pub metadata: DocumentMetadata,
    pub similarity_score: f64,
}
