//! Embedding providers
//!
//! The engine only knows the [`EmbeddingProvider`] trait. [`HashingEmbedder`]
//! is a deterministic offline implementation; remote models live behind the
//! same trait (see [`crate::openai`]).

use async_trait::async_trait;
use pricematch_core::ProviderError;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// Default dimension for hashed embeddings
pub const DEFAULT_HASH_DIM: usize = 256;

/// Source of dense text embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short name used in logs and timeout errors
    fn name(&self) -> &str;

    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// Feature-hashing embedder.
///
/// Character trigrams and whole words are hashed into a fixed number of
/// buckets and the result is normalized. Similar wording yields similar
/// vectors without any model or network access.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIM)
    }
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    /// Synchronous embedding, also used by the async trait impl
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();

        for trigram in trigrams(&normalized) {
            vector[self.bucket(&trigram)] += 1.0;
        }

        // Words contribute more than trigrams
        for word in normalized.split_whitespace() {
            vector[self.bucket(word)] += 2.0;
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut vector {
                *v /= magnitude;
            }
        }

        vector
    }

    fn bucket<T: Hash + ?Sized>(&self, value: &T) -> usize {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        (hasher.finish() as usize) % self.dim
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        Ok(self.embed_text(text))
    }
}

fn trigrams(s: &str) -> HashSet<String> {
    let padded = format!("  {}  ", s);
    let chars: Vec<char> = padded.chars().collect();
    chars
        .windows(3)
        .map(|w| w.iter().collect::<String>())
        .collect()
}
