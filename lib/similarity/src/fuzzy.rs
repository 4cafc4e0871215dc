//! Fuzzy matching of attribute sets against listing titles
//!
//! Used for live shopping results, which only carry an unstructured title.
//! Each component scores in [0, 1]; the final score is the weighted mean over
//! the components that actually apply.

use crate::criteria::{normalize_key, FuzzyConfig, MatchingCriteria};
use crate::distance::{contains_ignore_case, sequence_ratio};
use pricematch_core::{spec_value_text, AttributeSet, Result};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

const SIZE_PATTERN: &str =
    r#"(?i)\b\d+(?:\.\d+)?\s*(?:(?:inches|inch|in|feet|ft|cm|mm)\b|["'])"#;

fn size_regex() -> &'static Regex {
    static SIZE_RE: OnceLock<Regex> = OnceLock::new();
    SIZE_RE.get_or_init(|| Regex::new(SIZE_PATTERN).expect("size pattern is valid"))
}

/// Pull `<number><unit>` tokens such as "50ft" or "12 inch" out of free text
pub fn extract_size_tokens(text: &str) -> Vec<String> {
    size_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Per-component outcome of one fuzzy match.
///
/// `None` means the component did not apply: disabled by criteria or the
/// attribute is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchBreakdown {
    pub score: f32,
    pub applied_weight: f32,
    pub title: Option<f32>,
    pub brand: Option<f32>,
    pub color: Option<f32>,
    pub size: Option<f32>,
    pub specifications: Option<f32>,
}

/// Weighted lexical matcher
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    config: FuzzyConfig,
    specification_keys: Vec<String>,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::from_valid_config(FuzzyConfig::default())
    }
}

impl FuzzyMatcher {
    pub fn new(config: FuzzyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: FuzzyConfig) -> Self {
        let mut specification_keys: Vec<String> = config
            .specification_keys
            .iter()
            .map(|k| normalize_key(k))
            .filter(|k| !k.is_empty())
            .collect();
        specification_keys.sort();
        specification_keys.dedup();

        Self {
            config,
            specification_keys,
        }
    }

    pub fn config(&self) -> &FuzzyConfig {
        &self.config
    }

    /// Composite match score in [0, 1]
    pub fn score(&self, attrs: &AttributeSet, title: &str, criteria: &MatchingCriteria) -> f32 {
        self.score_detailed(attrs, title, criteria).score
    }

    pub fn score_detailed(
        &self,
        attrs: &AttributeSet,
        title: &str,
        criteria: &MatchingCriteria,
    ) -> MatchBreakdown {
        let weights = &self.config.weights;
        let mut breakdown = MatchBreakdown::default();
        let mut total = 0.0f32;

        let mut applied = 0.0f32;
        let mut apply = |slot: &mut Option<f32>, score: f32, weight: f32| -> f32 {
            *slot = Some(score);
            total += score * weight;
            weight
        };

        if criteria.title_matching {
            applied += apply(
                &mut breakdown.title,
                sequence_ratio(attrs.product_type(), title),
                weights.title,
            );
        }

        if criteria.brand_matching {
            if let Some(brand) = attrs.brand() {
                applied += apply(&mut breakdown.brand, presence(title, brand), weights.brand);
            }
        }

        if criteria.color_matching {
            if let Some(color) = attrs.color() {
                applied += apply(&mut breakdown.color, presence(title, color), weights.color);
            }
        }

        if criteria.size_matching {
            if let Some(size) = attrs.size() {
                applied += apply(&mut breakdown.size, self.size_score(size, title), weights.size);
            }
        }

        if criteria.specifications_matching {
            if let Some(score) = self.specification_score(attrs, title) {
                applied += apply(&mut breakdown.specifications, score, weights.specifications);
            }
        }

        breakdown.applied_weight = applied;
        breakdown.score = if applied > 0.0 {
            (total / applied).clamp(0.0, 1.0)
        } else {
            0.0
        };
        breakdown
    }

    /// 1.0 when any size token from the attribute is close to one in the title
    fn size_score(&self, size: &str, title: &str) -> f32 {
        let wanted = extract_size_tokens(size);
        if wanted.is_empty() {
            return 0.0;
        }
        let found = extract_size_tokens(title);
        let threshold = self.config.size_similarity_threshold;

        let matched = wanted.iter().any(|w| {
            found
                .iter()
                .any(|f| sequence_ratio(w, f) > threshold)
        });
        if matched {
            1.0
        } else {
            0.0
        }
    }

    /// Share of configured specification values visible in the title.
    ///
    /// `None` when the attribute set has none of the configured keys.
    fn specification_score(&self, attrs: &AttributeSet, title: &str) -> Option<f32> {
        if self.specification_keys.is_empty() {
            return None;
        }

        let mut applicable = 0usize;
        let mut hits = 0usize;
        for (key, value) in attrs.specifications() {
            if self
                .specification_keys
                .binary_search(&normalize_key(key))
                .is_err()
            {
                continue;
            }
            let Some(value) = spec_value_text(value) else {
                continue;
            };
            applicable += 1;
            if contains_ignore_case(title, &value) {
                hits += 1;
            }
        }

        if applicable == 0 {
            None
        } else {
            Some(hits as f32 / applicable as f32)
        }
    }
}

fn presence(title: &str, needle: &str) -> f32 {
    if contains_ignore_case(title, needle) {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::FuzzyWeights;

    const TITLE: &str = "Brightown 50ft Warm White LED String Lights";

    fn brightown() -> AttributeSet {
        AttributeSet::new("string lights", "lighting")
            .unwrap()
            .with_brand("Brightown")
            .with_color("warm white")
    }

    #[test]
    fn test_strong_match_scores_high() {
        let matcher = FuzzyMatcher::default();
        let score = matcher.score(&brightown(), TITLE, &MatchingCriteria::all());
        assert!(score > 0.7, "Expected > 0.7, got {}", score);
    }

    #[test]
    fn test_disabling_brand_reweights() {
        let matcher = FuzzyMatcher::default();
        let all = matcher.score_detailed(&brightown(), TITLE, &MatchingCriteria::all());
        let no_brand = matcher.score_detailed(
            &brightown(),
            TITLE,
            &MatchingCriteria::all().without_brand(),
        );

        assert!((all.score - no_brand.score).abs() > 1e-3);
        assert_eq!(no_brand.brand, None);
        // Brand weight is removed from the denominator rather than scored as a miss
        assert!((all.applied_weight - no_brand.applied_weight - 0.3).abs() < 1e-6);
        let expected = (no_brand.title.unwrap() * 0.4 + 0.15) / 0.55;
        assert!((no_brand.score - expected).abs() < 1e-5);
    }

    #[test]
    fn test_missing_attributes_do_not_penalize() {
        let matcher = FuzzyMatcher::default();
        let bare = AttributeSet::new("string lights", "lighting").unwrap();
        let breakdown = matcher.score_detailed(&bare, "String Lights", &MatchingCriteria::all());
        assert_eq!(breakdown.score, 1.0);
        assert_eq!(breakdown.brand, None);
        assert_eq!(breakdown.color, None);
        assert_eq!(breakdown.size, None);
        assert_eq!(breakdown.specifications, None);
    }

    #[test]
    fn test_nothing_applicable_scores_zero() {
        let matcher = FuzzyMatcher::default();
        let criteria = MatchingCriteria::all().without_title();
        let bare = AttributeSet::new("string lights", "lighting").unwrap();
        assert_eq!(matcher.score(&bare, TITLE, &criteria), 0.0);
    }

    #[test]
    fn test_wrong_brand_counts_as_miss() {
        let matcher = FuzzyMatcher::default();
        let attrs = AttributeSet::new("string lights", "lighting")
            .unwrap()
            .with_brand("SolarGlow");
        let breakdown = matcher.score_detailed(&attrs, TITLE, &MatchingCriteria::all());
        assert_eq!(breakdown.brand, Some(0.0));
        assert!(breakdown.score < 0.5);
    }

    #[test]
    fn test_size_match() {
        let matcher = FuzzyMatcher::default();
        let attrs = brightown().with_size("50 ft");
        let breakdown = matcher.score_detailed(&attrs, TITLE, &MatchingCriteria::all());
        assert_eq!(breakdown.size, Some(1.0));

        let other = matcher.score_detailed(
            &attrs,
            "Brightown 25ft Warm White LED String Lights",
            &MatchingCriteria::all(),
        );
        assert_eq!(other.size, Some(0.0));
    }

    #[test]
    fn test_extract_size_tokens() {
        assert_eq!(extract_size_tokens("Lamp 12 inch, 30cm base"), vec!["12 inch", "30cm"]);
        assert_eq!(extract_size_tokens("48\" shelf"), vec!["48\""]);
        assert!(extract_size_tokens("large").is_empty());
    }

    #[test]
    fn test_specification_match() {
        let matcher = FuzzyMatcher::default();
        let attrs = AttributeSet::new("string lights", "lighting")
            .unwrap()
            .with_specification("light_color", "warm white")
            .with_specification("Power Source", "solar")
            .with_specification("bulb_count", 25);

        let breakdown = matcher.score_detailed(&attrs, TITLE, &MatchingCriteria::all());
        // bulb_count is not a title-visible key; one of two listed values appears
        assert_eq!(breakdown.specifications, Some(0.5));
    }

    #[test]
    fn test_specification_keys_are_configurable() {
        let config = FuzzyConfig {
            specification_keys: vec!["bulb_count".to_string()],
            ..Default::default()
        };
        let matcher = FuzzyMatcher::new(config).unwrap();
        let attrs = AttributeSet::new("string lights", "lighting")
            .unwrap()
            .with_specification("light_color", "warm white")
            .with_specification("bulb count", 25);

        let breakdown =
            matcher.score_detailed(&attrs, "String Lights 25 Bulbs", &MatchingCriteria::all());
        assert_eq!(breakdown.specifications, Some(1.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FuzzyConfig {
            weights: FuzzyWeights {
                title: -1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(FuzzyMatcher::new(config).is_err());
    }
}
