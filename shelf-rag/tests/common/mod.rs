//! Shared test doubles: a deterministic keyword embedder and counting wrappers.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use shelf_rag::{
    EmbeddingProvider, IndexedVector, Match, NormalizedDocument, RagError, SourceRecord,
    VectorStore, normalize,
};

/// Space-separated keyword groups; each one is a dimension of the embedding.
const TOPICS: [&str; 4] = [
    "science fiction worldbuilding dune space planet galaxy robot",
    "recipe cooking cake chocolate bake kitchen flavor",
    "love romance marriage heart pride prejudice",
    "history war empire ancient revolution",
];

pub const DIMENSIONS: usize = TOPICS.len() + 1;

/// Counts topic keywords per group plus a constant bias dimension, then
/// L2-normalizes. Texts sharing a topic land close together.
#[derive(Default)]
pub struct TopicEmbedder {
    pub calls: AtomicUsize,
}

impl TopicEmbedder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn topic_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIMENSIONS];
    let tokens = text.split(|c: char| !c.is_alphanumeric());
    for token in tokens.filter(|t| !t.is_empty()) {
        let token = token.to_lowercase();
        for (i, words) in TOPICS.iter().enumerate() {
            if words.split(' ').any(|w| w == token) {
                v[i] += 1.0;
            }
        }
    }
    v[DIMENSIONS - 1] = 1.0;
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    v.iter_mut().for_each(|x| *x /= norm);
    v
}

#[async_trait]
impl EmbeddingProvider for TopicEmbedder {
    fn name(&self) -> &str {
        "Topic"
    }

    async fn embed(&self, text: &str) -> shelf_rag::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(topic_vector(text))
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }
}

/// Fails every call after the first `ok_calls`.
pub struct FlakyEmbedder {
    pub ok_calls: usize,
    pub calls: AtomicUsize,
}

impl FlakyEmbedder {
    pub fn failing_after(ok_calls: usize) -> Arc<Self> {
        Arc::new(Self {
            ok_calls,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    fn name(&self) -> &str {
        "Flaky"
    }

    async fn embed(&self, text: &str) -> shelf_rag::Result<Vec<f32>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n >= self.ok_calls {
            return Err(RagError::EmbeddingError {
                provider: "Flaky".into(),
                message: "model unavailable: secret upstream detail".into(),
            });
        }
        Ok(topic_vector(text))
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }
}

/// Wraps a store and counts searches.
pub struct CountingStore<S> {
    pub inner: S,
    pub searches: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Arc<Self> {
        Arc::new(Self {
            inner,
            searches: AtomicUsize::new(0),
        })
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: VectorStore> VectorStore for CountingStore<S> {
    async fn add(&self, vectors: &[IndexedVector]) -> shelf_rag::Result<()> {
        self.inner.add(vectors).await
    }

    async fn replace(&self, vectors: &[IndexedVector]) -> shelf_rag::Result<()> {
        self.inner.replace(vectors).await
    }

    async fn clear(&self) -> shelf_rag::Result<()> {
        self.inner.clear().await
    }

    async fn search(&self, query: &[f32], k: usize) -> shelf_rag::Result<Vec<Match>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search(query, k).await
    }

    async fn len(&self) -> shelf_rag::Result<usize> {
        self.inner.len().await
    }
}

pub fn record(name: &str, authors: &str, quote: &str, review: &str, why: &str) -> SourceRecord {
    SourceRecord {
        name: name.into(),
        authors: authors.into(),
        favorite_quote: quote.into(),
        one_line_review: review.into(),
        why_should_read: why.into(),
    }
}

pub fn dune() -> NormalizedDocument {
    normalize(&record(
        "Dune",
        "Frank Herbert",
        "Fear is the mind-killer",
        "Epic",
        "Worldbuilding",
    ))
}

pub fn reading_list() -> Vec<NormalizedDocument> {
    vec![
        dune(),
        normalize(&record(
            "Pride and Prejudice",
            "Jane Austen",
            "It is a truth universally acknowledged",
            "Sharp romance",
            "Marriage, love and pride",
        )),
        normalize(&record(
            "The Guns of August",
            "Barbara Tuchman",
            "Nothing so comforts the military mind",
            "Gripping history",
            "How the war began",
        )),
        normalize(&record(
            "Foundation",
            "Isaac Asimov",
            "Violence is the last refuge of the incompetent",
            "Science fiction classic",
            "A galaxy-spanning empire",
        )),
    ]
}
