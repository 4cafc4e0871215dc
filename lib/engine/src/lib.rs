//! # PriceMatch Engine
//!
//! Orchestrates attribute extraction, catalog ranking and live price
//! comparison over injected collaborators.
//!
//! ```text
//! ProductInput ──> FeatureExtractor ──> AttributeSet
//!                                          │
//!              ┌───────────────────────────┴──────────────┐
//!              v                                          v
//!   CatalogStore + EmbeddingCache              LiveSearchProvider
//!   (cosine similarity + price)            (fuzzy title match + price)
//!              │                                          │
//!              └──────────────> ResultComposer <──────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pricematch_core::{AttributeSet, LiveListing};
//! use pricematch_engine::{LiveQuery, RankingEngine};
//!
//! let engine = RankingEngine::builder().build().unwrap();
//! let attrs = AttributeSet::new("string lights", "lighting")
//!     .unwrap()
//!     .with_brand("Brightown")
//!     .with_color("warm white");
//!
//! let listings = vec![
//!     LiveListing::new("Brightown 50ft Warm White LED String Lights", "$29.99"),
//!     LiveListing::new("Stainless Steel Saucepan", "$15.00"),
//! ];
//! let results = engine
//!     .score_live_listings(&attrs, listings, &LiveQuery::default())
//!     .unwrap();
//! assert_eq!(results.len(), 1);
//! ```

pub mod config;
pub mod engine;
pub mod providers;
pub mod query;

pub use config::{CatalogDefaults, EngineConfig, ExtractionConfig, LiveConfig};
pub use engine::{
    CatalogQuery, CombinedQuery, CombinedResults, LiveComparison, LiveQuery, ProductInput,
    RankingEngine, RankingEngineBuilder,
};
pub use providers::{
    CatalogFilter, CatalogStore, FeatureExtractor, InMemoryCatalog, LiveSearchProvider,
    SearchRequest,
};
pub use query::{build_search_query, MAX_QUERY_CHARS};
