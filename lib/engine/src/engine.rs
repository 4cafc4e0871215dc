//! The ranking engine
//!
//! [`RankingEngine`] wires the scoring crates to the injected collaborators.
//! Catalog ranking goes through embeddings and cosine similarity; live
//! listings are scored lexically against their titles and never touch the
//! embedding provider.

use crate::config::{CatalogDefaults, EngineConfig};
use crate::providers::{CatalogFilter, CatalogStore, FeatureExtractor, LiveSearchProvider, SearchRequest};
use crate::query::build_search_query;
use futures_util::future::try_join;
use pricematch_core::text::{synthesize_attributes, synthesize_product};
use pricematch_core::{AttributeSet, CatalogProduct, Error, ExtractedAttributes, LiveListing, ProviderError, Result};
use pricematch_embedding::{CacheStats, Clock, EmbeddingCache, EmbeddingProvider, HashingEmbedder, SystemClock};
use pricematch_similarity::{
    cosine_scores, listing_price, matches_category, CandidateFilter, FuzzyMatcher, MatchBreakdown,
    MatchingCriteria, PackInfo, PriceBasis, PriceFilter, PriceScorer, PriceSummary, RankingStats,
    RelevanceKind, ResultComposer, ScoredCandidate,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Raw user input for attribute extraction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductInput {
    pub text: Option<String>,
    pub image_base64: Option<String>,
}

impl ProductInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image_base64: None,
        }
    }

    pub fn image(image_base64: impl Into<String>) -> Self {
        Self {
            text: None,
            image_base64: Some(image_base64.into()),
        }
    }
}

/// Parameters of a catalog ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    pub max_results: usize,
    pub category_filter: Option<String>,
    pub price_weight: f32,
    pub similarity_weight: f32,
    pub price_range: Option<PriceFilter>,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::from(&CatalogDefaults::default())
    }
}

impl From<&CatalogDefaults> for CatalogQuery {
    fn from(defaults: &CatalogDefaults) -> Self {
        Self {
            max_results: defaults.max_results,
            category_filter: None,
            price_weight: defaults.price_weight,
            similarity_weight: defaults.similarity_weight,
            price_range: None,
        }
    }
}

/// Parameters of a live listing ranking.
///
/// By default listings are ordered by match score alone; raise
/// `price_weight` to favour cheaper offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveQuery {
    pub matching_criteria: MatchingCriteria,
    pub max_results: usize,
    /// Overrides the configured minimum match score
    pub min_match_score: Option<f32>,
    pub price_range: Option<PriceFilter>,
    pub price_basis: PriceBasis,
    pub relevance_weight: f32,
    pub price_weight: f32,
    pub include_price_stats: bool,
}

impl Default for LiveQuery {
    fn default() -> Self {
        Self {
            matching_criteria: MatchingCriteria::all(),
            max_results: 10,
            min_match_score: None,
            price_range: None,
            price_basis: PriceBasis::Listed,
            relevance_weight: 1.0,
            price_weight: 0.0,
            include_price_stats: true,
        }
    }
}

/// Parameters of a combined catalog and live search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinedQuery {
    pub include_local: bool,
    pub include_live: bool,
    pub catalog: CatalogQuery,
    pub live: LiveQuery,
}

impl Default for CombinedQuery {
    fn default() -> Self {
        Self {
            include_local: true,
            include_live: true,
            catalog: CatalogQuery::default(),
            live: LiveQuery::default(),
        }
    }
}

/// Live listings with their price statistics
#[derive(Debug, Clone, Serialize)]
pub struct LiveComparison {
    pub products: Vec<ScoredCandidate<LiveListing>>,
    pub price_stats: Option<PriceSummary>,
    pub total_found: usize,
    pub search_query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinedResults {
    pub local_matches: Vec<ScoredCandidate<CatalogProduct>>,
    pub live_products: Vec<ScoredCandidate<LiveListing>>,
    pub price_stats: Option<PriceSummary>,
    /// Empty when live search was not requested
    pub search_query: String,
}

/// Ranks catalog products and live listings for a set of attributes
pub struct RankingEngine {
    config: EngineConfig,
    embeddings: EmbeddingCache,
    matcher: FuzzyMatcher,
    price_scorer: PriceScorer,
    extractor: Option<Arc<dyn FeatureExtractor>>,
    live_search: Option<Arc<dyn LiveSearchProvider>>,
    catalog: Option<Arc<dyn CatalogStore>>,
}

impl RankingEngine {
    pub fn builder() -> RankingEngineBuilder {
        RankingEngineBuilder::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn embedding_stats(&self) -> CacheStats {
        self.embeddings.stats()
    }

    /// Catalog query seeded from the configured defaults
    pub fn catalog_query(&self) -> CatalogQuery {
        CatalogQuery::from(&self.config.catalog)
    }

    /// Extract attributes from text, an image, or both.
    ///
    /// With both inputs the two extractions run concurrently; text results
    /// take precedence and image results fill the gaps.
    pub async fn analyze(&self, input: &ProductInput) -> Result<AttributeSet> {
        let text = non_blank(input.text.as_deref());
        let image = non_blank(input.image_base64.as_deref());
        if text.is_none() && image.is_none() {
            return Err(missing_input());
        }

        let extractor = self.extractor()?;
        let timeout_ms = self.config.extraction.timeout_ms;
        info!(text = text.is_some(), image = image.is_some(), "analyzing product input");

        let from_text = async {
            match text {
                Some(t) => with_timeout(extractor.name(), timeout_ms, extractor.extract_from_text(t))
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };
        let from_image = async {
            match image {
                Some(i) => with_timeout(extractor.name(), timeout_ms, extractor.extract_from_image(i))
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };

        let extracted: ExtractedAttributes = match try_join(from_text, from_image).await? {
            (Some(t), Some(i)) => t.merge(i),
            (Some(t), None) => t,
            (None, Some(i)) => i,
            (None, None) => return Err(missing_input()),
        };

        let attrs = extracted.into_attribute_set()?;
        debug!(product_type = attrs.product_type(), category = attrs.category(), "extracted attributes");
        Ok(attrs)
    }

    /// Rank catalog products by embedding similarity and price.
    ///
    /// The category filter is applied before price scoring, so prices are
    /// compared only within the requested category.
    pub async fn rank_against_catalog(
        &self,
        attrs: &AttributeSet,
        query: &CatalogQuery,
    ) -> Result<Vec<ScoredCandidate<CatalogProduct>>> {
        let composer = ResultComposer::new(query.similarity_weight, query.price_weight)?;
        let catalog = self.catalog()?;

        let filter = CatalogFilter {
            category: query.category_filter.clone(),
            product_type: None,
        };
        let mut products = catalog.products(&filter)?;
        if let Some(category) = &query.category_filter {
            products.retain(|p| matches_category(p, category));
        }
        if products.is_empty() {
            debug!("no catalog candidates");
            return Ok(Vec::new());
        }

        let query_vector = self.embeddings.resolve(&synthesize_attributes(attrs)).await?;
        let texts: Vec<String> = products.iter().map(synthesize_product).collect();
        let vectors = self.embeddings.resolve_many(&texts).await?;
        let similarities = cosine_scores(&query_vector, &vectors)?;

        let prices: Vec<Option<f64>> = products.iter().map(|p| Some(p.price)).collect();
        let price_scores = self.price_scorer.score_all(&prices);
        let candidates_count = products.len();
        let scored: Vec<ScoredCandidate<CatalogProduct>> = products
            .into_iter()
            .zip(similarities)
            .zip(price_scores)
            .map(|((product, similarity), price_score)| {
                let price = product.price;
                // Anti-correlated embeddings count as no match
                ScoredCandidate::new(
                    product,
                    RelevanceKind::Semantic,
                    similarity.max(0.0),
                    Some(price),
                    price_score,
                )
            })
            .collect();

        let candidate_filter = CandidateFilter {
            min_relevance: None,
            category: query.category_filter.clone(),
            price_range: query.price_range,
        };
        let results = composer.compose(scored, &candidate_filter, query.max_results);

        let stats = RankingStats::compute(&results, candidates_count);
        info!(
            candidates = stats.candidates_count,
            results = stats.results_count,
            best_score = stats.best_score,
            avg_score = stats.avg_score,
            "ranked catalog"
        );
        Ok(results)
    }

    /// Score already-fetched listings by fuzzy title match and price
    pub fn score_live_listings(
        &self,
        attrs: &AttributeSet,
        listings: Vec<LiveListing>,
        query: &LiveQuery,
    ) -> Result<Vec<ScoredCandidate<LiveListing>>> {
        let composer = ResultComposer::new(query.relevance_weight, query.price_weight)?;
        if listings.is_empty() {
            return Ok(Vec::new());
        }

        let matcher = &self.matcher;
        let breakdowns: Vec<MatchBreakdown> = listings
            .par_iter()
            .map(|l| matcher.score_detailed(attrs, &l.title, &query.matching_criteria))
            .collect();

        let prices: Vec<Option<f64>> = listings.iter().map(listing_price).collect();
        let packs: Vec<PackInfo> = listings
            .iter()
            .zip(&prices)
            .map(|(l, price)| PackInfo::from_title(&l.title, *price))
            .collect();
        let basis: Vec<Option<f64>> = packs
            .iter()
            .zip(&prices)
            .map(|(pack, price)| pack.basis_price(*price, query.price_basis))
            .collect();
        let price_scores = self.price_scorer.score_all(&basis);

        let unpriced = prices.iter().filter(|p| p.is_none()).count();
        if unpriced > 0 {
            warn!(unpriced, "listings without a parseable price");
        }

        let candidates_count = listings.len();
        let scored: Vec<ScoredCandidate<LiveListing>> = listings
            .into_iter()
            .zip(breakdowns)
            .zip(prices)
            .zip(packs)
            .zip(price_scores)
            .map(|((((listing, breakdown), price), pack), price_score)| {
                ScoredCandidate::new(listing, RelevanceKind::Fuzzy, breakdown.score, price, price_score)
                    .with_pack(pack)
                    .with_breakdown(breakdown)
            })
            .collect();

        let filter = CandidateFilter {
            min_relevance: Some(query.min_match_score.unwrap_or(self.config.live.min_match_score)),
            category: None,
            price_range: query.price_range,
        };
        let results = composer.compose(scored, &filter, query.max_results);

        let stats = RankingStats::compute(&results, candidates_count);
        info!(
            candidates = stats.candidates_count,
            results = stats.results_count,
            best_score = stats.best_score,
            avg_score = stats.avg_score,
            "scored live listings"
        );
        Ok(results)
    }

    /// Price statistics of scored listings; `None` when none has a price
    pub fn price_comparison_summary(&self, results: &[ScoredCandidate<LiveListing>]) -> Option<PriceSummary> {
        PriceSummary::from_candidates(results)
    }

    /// Search the live provider and score what comes back
    pub async fn search_live(
        &self,
        attrs: &AttributeSet,
        query: &LiveQuery,
    ) -> Result<Vec<ScoredCandidate<LiveListing>>> {
        let (_, results) = self.fetch_live(attrs, query).await?;
        Ok(results)
    }

    /// Live listings plus price statistics.
    ///
    /// Statistics describe every listing that passed the match threshold
    /// out of a full `max_fetch` search. The price range and `max_results`
    /// only narrow the returned products.
    pub async fn compare_prices(&self, attrs: &AttributeSet, query: &LiveQuery) -> Result<LiveComparison> {
        let pool_query = LiveQuery {
            max_results: self.config.live.max_fetch,
            price_range: None,
            ..query.clone()
        };
        let (search_query, pool) = self.fetch_live(attrs, &pool_query).await?;
        let price_stats = if query.include_price_stats {
            self.price_comparison_summary(&pool)
        } else {
            None
        };

        let in_range = CandidateFilter {
            price_range: query.price_range,
            ..Default::default()
        };
        let products: Vec<ScoredCandidate<LiveListing>> = pool
            .into_iter()
            .filter(|r| in_range.accepts(r))
            .take(query.max_results)
            .collect();

        Ok(LiveComparison {
            total_found: products.len(),
            products,
            price_stats,
            search_query,
        })
    }

    /// Catalog ranking and live comparison side by side, run concurrently
    pub async fn search_combined(&self, attrs: &AttributeSet, query: &CombinedQuery) -> Result<CombinedResults> {
        let local = async {
            if query.include_local {
                self.rank_against_catalog(attrs, &query.catalog).await
            } else {
                Ok(Vec::new())
            }
        };
        let live = async {
            if query.include_live {
                self.compare_prices(attrs, &query.live).await.map(Some)
            } else {
                Ok(None)
            }
        };

        let (local_matches, live) = try_join(local, live).await?;
        let (live_products, price_stats, search_query) = match live {
            Some(comparison) => (comparison.products, comparison.price_stats, comparison.search_query),
            None => (Vec::new(), None, String::new()),
        };

        info!(
            local = local_matches.len(),
            live = live_products.len(),
            "combined search finished"
        );
        Ok(CombinedResults {
            local_matches,
            live_products,
            price_stats,
            search_query,
        })
    }

    async fn fetch_live(
        &self,
        attrs: &AttributeSet,
        query: &LiveQuery,
    ) -> Result<(String, Vec<ScoredCandidate<LiveListing>>)> {
        let search_query = build_search_query(attrs);
        if search_query.is_empty() {
            warn!("empty search query generated");
            return Ok((search_query, Vec::new()));
        }

        let provider = self.live_search()?;
        let live = &self.config.live;
        let request = SearchRequest {
            query: search_query.clone(),
            location: live.location.clone(),
            language: live.language.clone(),
            country: live.country.clone(),
            num: live.fetch_count(query.max_results),
        };

        info!(query = %request.query, num = request.num, provider = provider.name(), "searching live listings");
        let listings = with_timeout(provider.name(), live.timeout_ms, provider.search(&request)).await?;
        debug!(found = listings.len(), "live search returned");

        let results = self.score_live_listings(attrs, listings, query)?;
        Ok((search_query, results))
    }

    fn extractor(&self) -> Result<&Arc<dyn FeatureExtractor>> {
        self.extractor
            .as_ref()
            .ok_or_else(|| Error::InvalidConfig("no feature extractor configured".to_string()))
    }

    fn live_search(&self) -> Result<&Arc<dyn LiveSearchProvider>> {
        self.live_search
            .as_ref()
            .ok_or_else(|| Error::InvalidConfig("no live search provider configured".to_string()))
    }

    fn catalog(&self) -> Result<&Arc<dyn CatalogStore>> {
        self.catalog
            .as_ref()
            .ok_or_else(|| Error::InvalidConfig("no catalog store configured".to_string()))
    }
}

/// Builder for [`RankingEngine`].
///
/// Only the embedding provider has a default (the offline
/// [`HashingEmbedder`]); operations that need a missing collaborator fail
/// with `InvalidConfig`.
#[derive(Default)]
pub struct RankingEngineBuilder {
    config: EngineConfig,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    clock: Option<Arc<dyn Clock>>,
    extractor: Option<Arc<dyn FeatureExtractor>>,
    live_search: Option<Arc<dyn LiveSearchProvider>>,
    catalog: Option<Arc<dyn CatalogStore>>,
}

impl RankingEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Clock used for embedding cache expiry
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn FeatureExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn live_search(mut self, provider: Arc<dyn LiveSearchProvider>) -> Self {
        self.live_search = Some(provider);
        self
    }

    pub fn catalog(mut self, catalog: Arc<dyn CatalogStore>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn build(self) -> Result<RankingEngine> {
        self.config.validate()?;

        let embedder = self
            .embedder
            .unwrap_or_else(|| Arc::new(HashingEmbedder::default()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let embeddings = EmbeddingCache::with_clock(embedder, &self.config.embedding, clock)?;

        Ok(RankingEngine {
            matcher: FuzzyMatcher::new(self.config.fuzzy.clone())?,
            price_scorer: PriceScorer::new(self.config.price)?,
            embeddings,
            config: self.config,
            extractor: self.extractor,
            live_search: self.live_search,
            catalog: self.catalog,
        })
    }
}

async fn with_timeout<T, F>(provider: &str, timeout_ms: u64, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, ProviderError>>,
{
    match tokio::time::timeout(Duration::from_millis(timeout_ms), call).await {
        Ok(result) => result.map_err(Error::from),
        Err(_) => Err(Error::ProviderTimeout {
            provider: provider.to_string(),
            timeout_ms,
        }),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn missing_input() -> Error {
    Error::InvalidInput("either a text description or an image is required".to_string())
}
