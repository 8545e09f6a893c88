//! Embedding provider trait: the text → vector collaborator.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that turns text into fixed-dimension vectors.
///
/// Both ingestion and querying go through this trait, so the same provider
/// (and model) must be used for an index and the queries against it.
/// The default [`embed_batch`](EmbeddingProvider::embed_batch) calls
/// [`embed`](EmbeddingProvider::embed) once per input; backends with a native
/// batch endpoint should override it.
///
/// # Example
///
/// ```rust,ignore
/// use shelf_rag::EmbeddingProvider;
///
/// let vector = provider.embed("science fiction worldbuilding").await?;
/// assert_eq!(vector.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider name used in logs and error messages.
    fn name(&self) -> &str;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of inputs, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
