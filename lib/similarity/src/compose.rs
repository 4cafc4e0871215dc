//! Result composition
//!
//! Combines relevance and price scores into one ranking, applies the
//! request filters, sorts and truncates.

use crate::fuzzy::MatchBreakdown;
use crate::price::PackInfo;
use pricematch_core::{Candidate, Error, Result};
use serde::{Deserialize, Serialize};

/// Where a candidate's relevance score came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceKind {
    /// Cosine similarity of embeddings
    Semantic,
    /// Weighted lexical match against a title
    Fuzzy,
}

/// A candidate with all of its scores for one ranking request
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate<T> {
    pub candidate: T,
    pub relevance_kind: RelevanceKind,
    /// Similarity or fuzzy score in [0, 1]
    pub relevance_score: f32,
    pub price_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    pub combined_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_breakdown: Option<MatchBreakdown>,
}

impl<T> ScoredCandidate<T> {
    pub fn new(
        candidate: T,
        relevance_kind: RelevanceKind,
        relevance_score: f32,
        price: Option<f64>,
        price_score: f32,
    ) -> Self {
        Self {
            candidate,
            relevance_kind,
            relevance_score,
            price_score,
            price,
            pack_quantity: None,
            unit_price: None,
            combined_score: 0.0,
            match_breakdown: None,
        }
    }

    #[must_use]
    pub fn with_pack(mut self, pack: PackInfo) -> Self {
        self.pack_quantity = pack.pack_quantity;
        self.unit_price = pack.unit_price;
        self
    }

    #[must_use]
    pub fn with_breakdown(mut self, breakdown: MatchBreakdown) -> Self {
        self.match_breakdown = Some(breakdown);
        self
    }
}

/// Inclusive price bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceFilter {
    pub min: f64,
    pub max: f64,
}

impl PriceFilter {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(Error::InvalidInput(format!(
                "price range [{}, {}] is not a valid interval",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }
}

/// Filters applied before sorting and truncation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateFilter {
    /// Keep candidates whose relevance is strictly above this cutoff
    pub min_relevance: Option<f32>,
    /// Exact, case-insensitive category; candidates without one are dropped
    pub category: Option<String>,
    /// Candidates without a price are dropped when set
    pub price_range: Option<PriceFilter>,
}

impl CandidateFilter {
    pub fn accepts<T: Candidate>(&self, scored: &ScoredCandidate<T>) -> bool {
        if let Some(cutoff) = self.min_relevance {
            if scored.relevance_score <= cutoff {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !matches_category(&scored.candidate, category) {
                return false;
            }
        }
        if let Some(range) = &self.price_range {
            match scored.price {
                Some(price) if range.contains(price) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Exact category comparison ignoring case and surrounding whitespace
pub fn matches_category<T: Candidate>(candidate: &T, category: &str) -> bool {
    candidate
        .category()
        .map(|c| c.trim().to_lowercase() == category.trim().to_lowercase())
        .unwrap_or(false)
}

/// Weighted combination of relevance and price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultComposer {
    relevance_weight: f32,
    price_weight: f32,
}

impl ResultComposer {
    /// Weights are used as given; they need not sum to 1.
    pub fn new(relevance_weight: f32, price_weight: f32) -> Result<Self> {
        for (name, weight) in [("relevance", relevance_weight), ("price", price_weight)] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }
        Ok(Self {
            relevance_weight,
            price_weight,
        })
    }

    pub fn relevance_weight(&self) -> f32 {
        self.relevance_weight
    }

    pub fn price_weight(&self) -> f32 {
        self.price_weight
    }

    pub fn combine(&self, relevance: f32, price: f32) -> f32 {
        self.relevance_weight * relevance + self.price_weight * price
    }

    /// Score, filter, sort by combined score (descending, stable) and truncate
    pub fn compose<T: Candidate>(
        &self,
        candidates: Vec<ScoredCandidate<T>>,
        filter: &CandidateFilter,
        max_results: usize,
    ) -> Vec<ScoredCandidate<T>> {
        let mut results: Vec<ScoredCandidate<T>> = candidates
            .into_iter()
            .map(|mut scored| {
                scored.combined_score = self.combine(scored.relevance_score, scored.price_score);
                scored
            })
            .filter(|scored| filter.accepts(scored))
            .collect();

        // sort_by is stable: equal scores keep their input order
        results.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(max_results);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricematch_core::{CatalogProduct, LiveListing};

    fn product(id: u64, category: &str, price: f64) -> CatalogProduct {
        CatalogProduct::new(id, format!("Product {}", id), price, category, "lamp")
    }

    fn scored(id: u64, category: &str, relevance: f32) -> ScoredCandidate<CatalogProduct> {
        ScoredCandidate::new(
            product(id, category, 10.0),
            RelevanceKind::Semantic,
            relevance,
            Some(10.0),
            0.0,
        )
    }

    fn ids(results: &[ScoredCandidate<CatalogProduct>]) -> Vec<String> {
        results.iter().map(|r| r.candidate.id.to_string()).collect()
    }

    #[test]
    fn test_sorts_descending() {
        let composer = ResultComposer::new(1.0, 0.0).unwrap();
        let results = composer.compose(
            vec![scored(1, "a", 0.9), scored(2, "a", 0.4), scored(3, "a", 0.7)],
            &CandidateFilter::default(),
            10,
        );
        let scores: Vec<f32> = results.iter().map(|r| r.combined_score).collect();
        assert_eq!(scores, vec![0.9, 0.7, 0.4]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let composer = ResultComposer::new(1.0, 0.0).unwrap();
        let results = composer.compose(
            vec![scored(1, "a", 0.5), scored(2, "a", 0.8), scored(3, "a", 0.5), scored(4, "a", 0.5)],
            &CandidateFilter::default(),
            10,
        );
        assert_eq!(ids(&results), vec!["2", "1", "3", "4"]);
    }

    #[test]
    fn test_weighted_sum_not_normalized() {
        let composer = ResultComposer::new(0.7, 0.6).unwrap();
        assert!((composer.combine(1.0, 1.0) - 1.3).abs() < 1e-6);
        assert!(ResultComposer::new(-0.1, 0.3).is_err());
    }

    #[test]
    fn test_truncates_after_filtering() {
        let composer = ResultComposer::new(1.0, 0.0).unwrap();
        let filter = CandidateFilter {
            category: Some("Lighting".to_string()),
            ..Default::default()
        };
        let results = composer.compose(
            vec![
                scored(1, "furniture", 0.99),
                scored(2, "lighting", 0.3),
                scored(3, "LIGHTING", 0.6),
                scored(4, "lighting", 0.5),
            ],
            &filter,
            2,
        );
        assert_eq!(ids(&results), vec!["3", "4"]);
    }

    #[test]
    fn test_min_relevance_is_strict() {
        let composer = ResultComposer::new(1.0, 0.0).unwrap();
        let filter = CandidateFilter {
            min_relevance: Some(0.3),
            ..Default::default()
        };
        let results = composer.compose(
            vec![scored(1, "a", 0.3), scored(2, "a", 0.31)],
            &filter,
            10,
        );
        assert_eq!(ids(&results), vec!["2"]);
    }

    #[test]
    fn test_price_range_inclusive_and_requires_price() {
        let composer = ResultComposer::new(1.0, 0.0).unwrap();
        let filter = CandidateFilter {
            price_range: Some(PriceFilter::new(10.0, 20.0).unwrap()),
            ..Default::default()
        };
        let listings = vec![
            ScoredCandidate::new(LiveListing::new("a", "$10"), RelevanceKind::Fuzzy, 0.5, Some(10.0), 0.5),
            ScoredCandidate::new(LiveListing::new("b", "$20"), RelevanceKind::Fuzzy, 0.5, Some(20.0), 0.5),
            ScoredCandidate::new(LiveListing::new("c", "$25"), RelevanceKind::Fuzzy, 0.5, Some(25.0), 0.5),
            ScoredCandidate::new(LiveListing::new("d", "n/a"), RelevanceKind::Fuzzy, 0.5, None, 0.5),
        ];
        let results = composer.compose(listings, &filter, 10);
        let titles: Vec<&str> = results.iter().map(|r| r.candidate.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn test_invalid_price_filter() {
        assert!(PriceFilter::new(20.0, 10.0).is_err());
        assert!(PriceFilter::new(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn test_empty_input() {
        let composer = ResultComposer::new(0.7, 0.3).unwrap();
        let results: Vec<ScoredCandidate<CatalogProduct>> =
            composer.compose(Vec::new(), &CandidateFilter::default(), 10);
        assert!(results.is_empty());
    }
}
