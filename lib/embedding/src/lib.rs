//! # PriceMatch Embedding
//!
//! Text embedding behind a provider trait, with a bounded cache in front.
//!
//! - [`EmbeddingProvider`] - Async source of fixed-dimension vectors
//! - [`HashingEmbedder`] - Deterministic offline provider
//! - [`OpenAiEmbedder`] - OpenAI-compatible HTTP provider
//! - [`EmbeddingCache`] - LRU + TTL memoization with per-call timeout
//!
//! ## Example
//!
//! ```rust
//! use pricematch_embedding::{EmbeddingCache, EmbeddingCacheConfig, HashingEmbedder};
//! use std::sync::Arc;
//!
//! # tokio_test_block(async {
//! let cache = EmbeddingCache::new(
//!     Arc::new(HashingEmbedder::new(64)),
//!     &EmbeddingCacheConfig::default(),
//! ).unwrap();
//!
//! let first = cache.resolve("warm white string lights").await.unwrap();
//! let again = cache.resolve("warm white string lights").await.unwrap();
//! assert_eq!(first, again);
//! assert_eq!(cache.stats().hits, 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f);
//! # }
//! ```

pub mod cache;
pub mod openai;
pub mod provider;

pub use cache::{CacheStats, Clock, EmbeddingCache, EmbeddingCacheConfig, ManualClock, SystemClock};
pub use openai::{OpenAiConfig, OpenAiEmbedder};
pub use provider::{EmbeddingProvider, HashingEmbedder, DEFAULT_HASH_DIM};
