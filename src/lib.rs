//! # PriceMatch
//!
//! Product matching and price ranking.
//!
//! PriceMatch takes a product description, already turned into structured
//! attributes, and ranks candidates by relevance and price:
//!
//! - **Catalog products** are compared through text embeddings and cosine
//!   similarity, then blended with a price competitiveness score.
//! - **Live shopping listings** are matched lexically against their titles
//!   (product type, brand, color, size, specifications) and can be compared
//!   on unit price for multi-packs.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! pricematch match --attributes attrs.json --catalog data/sample_catalog.json
//! pricematch live --attributes attrs.json --listings listings.json --stats
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use pricematch::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> pricematch::Result<()> {
//! let catalog = InMemoryCatalog::load("data/sample_catalog.json")?;
//! let engine = RankingEngine::builder()
//!     .catalog(Arc::new(catalog))
//!     .build()?;
//!
//! let attrs = AttributeSet::new("string lights", "lighting")?
//!     .with_brand("Brightown")
//!     .with_color("warm white");
//!
//! let matches = engine.rank_against_catalog(&attrs, &engine.catalog_query()).await?;
//! for m in &matches {
//!     println!("{} {:.3}", m.candidate.name, m.combined_score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `pricematch-core` - Attributes, candidate records, vectors, text synthesis
//! - `pricematch-similarity` - Cosine, fuzzy matching, price scoring, composition
//! - `pricematch-embedding` - Embedding providers and the bounded embedding cache
//! - `pricematch-engine` - The ranking engine and its collaborator traits

// Re-export core types
pub use pricematch_core::{
    AttributeSet, Candidate, CatalogProduct, Error, ExtractedAttributes, LiveListing, ProductId,
    ProviderError, Result, Vector,
};

// Re-export scoring
pub use pricematch_similarity::{
    FuzzyConfig, FuzzyMatcher, MatchingCriteria, PackInfo, PriceBasis, PriceFilter, PriceScorer,
    PriceSummary, ResultComposer, ScoredCandidate,
};

// Re-export embeddings
pub use pricematch_embedding::{
    EmbeddingCache, EmbeddingCacheConfig, EmbeddingProvider, HashingEmbedder, OpenAiConfig,
    OpenAiEmbedder,
};

// Re-export engine
pub use pricematch_engine::{
    build_search_query, CatalogFilter, CatalogQuery, CatalogStore, CombinedQuery, CombinedResults,
    EngineConfig, FeatureExtractor, InMemoryCatalog, LiveComparison, LiveQuery, LiveSearchProvider,
    ProductInput, RankingEngine, SearchRequest,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AttributeSet, CatalogProduct, CatalogQuery, EngineConfig, Error, InMemoryCatalog,
        LiveListing, LiveQuery, MatchingCriteria, PriceBasis, RankingEngine, Result,
        ScoredCandidate,
    };
}

/// Text synthesis used as embedding input
pub mod text {
    pub use pricematch_core::text::{synthesize_attributes, synthesize_product};
}
