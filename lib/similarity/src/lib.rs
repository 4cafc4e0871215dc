//! # PriceMatch Similarity
//!
//! The scoring engine behind PriceMatch rankings.
//!
//! ## Features
//!
//! - **Semantic ranking**: cosine similarity of a query embedding against candidates
//! - **Fuzzy matching**: weighted lexical match of attributes against listing titles
//! - **Price scoring**: competitiveness within the candidate set, pack and unit prices
//! - **Composition**: weighted combination, filters, stable ordering, truncation
//!
//! ## Example
//!
//! ```rust
//! use pricematch_core::AttributeSet;
//! use pricematch_similarity::{FuzzyMatcher, MatchingCriteria, PriceScorer};
//!
//! let attrs = AttributeSet::new("string lights", "lighting")
//!     .unwrap()
//!     .with_brand("Brightown")
//!     .with_color("warm white");
//!
//! let matcher = FuzzyMatcher::default();
//! let score = matcher.score(
//!     &attrs,
//!     "Brightown 50ft Warm White LED String Lights",
//!     &MatchingCriteria::all(),
//! );
//! assert!(score > 0.7);
//!
//! let prices = [19.99, 29.99, 39.99];
//! let scorer = PriceScorer::default();
//! assert!(scorer.score(19.99, &prices) > scorer.score(39.99, &prices));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │  Semantic   │     │    Fuzzy    │
//! │ (cosine)    │     │  (titles)   │
//! └─────────────┘     └─────────────┘
//!        │                   │
//!        └────────┬──────────┘
//!                 │           ┌─────────────┐
//!                 │<──────────│    Price    │
//!                 v           └─────────────┘
//!          ┌─────────────┐
//!          │  Composer   │
//!          │ (sort/trim) │
//!          └─────────────┘
//! ```

pub mod compose;
pub mod criteria;
pub mod distance;
pub mod fuzzy;
pub mod price;
pub mod stats;

// Re-export main types for convenience
pub use compose::{
    matches_category, CandidateFilter, PriceFilter, RelevanceKind, ResultComposer,
    ScoredCandidate,
};
pub use criteria::{FuzzyConfig, FuzzyWeights, MatchingCriteria, DEFAULT_SPECIFICATION_KEYS};
pub use distance::{contains_ignore_case, cosine_scores, sequence_ratio};
pub use fuzzy::{extract_size_tokens, FuzzyMatcher, MatchBreakdown};
pub use price::{
    detect_pack_quantity, listing_price, parse_price_text, PackInfo, PriceBasis, PriceCurve,
    PriceScorer, NEUTRAL_PRICE_SCORE,
};
pub use stats::{PriceSummary, RankingStats};
