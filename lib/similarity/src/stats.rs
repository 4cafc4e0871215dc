//! Summary statistics over ranked results

use crate::compose::ScoredCandidate;
use serde::{Deserialize, Serialize};

/// Price statistics over a set of ranked candidates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Upper median: element `len / 2` of the sorted prices
    pub median: f64,
    /// `max - min`, 0 for a single price
    pub range: f64,
}

impl PriceSummary {
    /// `None` when no finite price is given
    pub fn from_prices(prices: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = prices.iter().copied().filter(|p| p.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let avg = sorted.iter().sum::<f64>() / sorted.len() as f64;
        let median = sorted[sorted.len() / 2];
        let range = if sorted.len() > 1 { max - min } else { 0.0 };

        Some(Self {
            min,
            max,
            avg,
            median,
            range,
        })
    }

    /// Summary over the candidates that carry a price
    pub fn from_candidates<T>(candidates: &[ScoredCandidate<T>]) -> Option<Self> {
        let prices: Vec<f64> = candidates.iter().filter_map(|c| c.price).collect();
        Self::from_prices(&prices)
    }
}

/// Shape of one ranking pass, for logs and responses
#[derive(Debug, Clone, Serialize)]
pub struct RankingStats {
    /// Number of candidates scored
    pub candidates_count: usize,
    /// Number of results returned
    pub results_count: usize,
    /// Average combined score of returned results
    pub avg_score: f32,
    /// Combined score of the top result
    pub best_score: f32,
}

impl RankingStats {
    /// `results` must already be sorted best first
    pub fn compute<T>(results: &[ScoredCandidate<T>], candidates_count: usize) -> Self {
        if results.is_empty() {
            return Self {
                candidates_count,
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
            };
        }

        let avg_score =
            results.iter().map(|r| r.combined_score).sum::<f32>() / results.len() as f32;

        Self {
            candidates_count,
            results_count: results.len(),
            avg_score,
            best_score: results[0].combined_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::RelevanceKind;
    use pricematch_core::LiveListing;

    fn listing(price: Option<f64>, combined: f32) -> ScoredCandidate<LiveListing> {
        let mut scored =
            ScoredCandidate::new(LiveListing::new("x", ""), RelevanceKind::Fuzzy, 0.5, price, 0.5);
        scored.combined_score = combined;
        scored
    }

    #[test]
    fn test_price_summary() {
        let summary = PriceSummary::from_prices(&[30.0, 10.0, 20.0, 40.0]).unwrap();
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 40.0);
        assert_eq!(summary.avg, 25.0);
        assert_eq!(summary.median, 30.0);
        assert_eq!(summary.range, 30.0);
    }

    #[test]
    fn test_single_price_has_zero_range() {
        let summary = PriceSummary::from_prices(&[12.0]).unwrap();
        assert_eq!(summary.median, 12.0);
        assert_eq!(summary.range, 0.0);
    }

    #[test]
    fn test_summary_skips_unpriced() {
        let candidates = vec![listing(Some(5.0), 0.9), listing(None, 0.8), listing(Some(15.0), 0.7)];
        let summary = PriceSummary::from_candidates(&candidates).unwrap();
        assert_eq!(summary.avg, 10.0);
        assert!(PriceSummary::from_candidates(&[listing(None, 0.1)]).is_none());
        assert!(PriceSummary::from_prices(&[]).is_none());
    }

    #[test]
    fn test_ranking_stats() {
        let results = vec![listing(None, 0.9), listing(None, 0.7), listing(None, 0.5)];
        let stats = RankingStats::compute(&results, 10);
        assert_eq!(stats.candidates_count, 10);
        assert_eq!(stats.results_count, 3);
        assert_eq!(stats.best_score, 0.9);
        assert!((stats.avg_score - 0.7).abs() < 1e-6);

        let empty = RankingStats::compute::<LiveListing>(&[], 4);
        assert_eq!(empty.results_count, 0);
    }
}
