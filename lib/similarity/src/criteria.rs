//! Fuzzy matching configuration
//!
//! Weights per scoring component, the per-request criteria toggles, and the
//! list of specification keys expected to show up in listing titles.

use pricematch_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Specification keys checked against listing titles when none are configured.
///
/// Tuned for lighting products; other catalogs should supply their own.
pub const DEFAULT_SPECIFICATION_KEYS: &[&str] = &[
    "light source type",
    "light color",
    "power source",
    "special feature",
    "installation type",
    "bulb type",
    "shape",
    "finish",
    "length",
    "wattage",
];

/// Relative weight of each fuzzy matching component
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FuzzyWeights {
    pub title: f32,
    pub brand: f32,
    pub color: f32,
    pub size: f32,
    pub specifications: f32,
}

impl Default for FuzzyWeights {
    fn default() -> Self {
        Self {
            title: 0.4,
            brand: 0.3,
            color: 0.15,
            size: 0.15,
            specifications: 0.25,
        }
    }
}

impl FuzzyWeights {
    /// Checks that weights are finite and non-negative with a positive total.
    ///
    /// Weights are not normalized here: the matcher divides by the weight it
    /// actually applied, so only ratios matter.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("title", self.title),
            ("brand", self.brand),
            ("color", self.color),
            ("size", self.size),
            ("specifications", self.specifications),
        ];

        for (name, weight) in named {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "fuzzy weight '{}' must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }

        let total: f32 = named.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return Err(Error::InvalidConfig(
                "fuzzy weights cannot all be zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Per-request switches for fuzzy matching components.
///
/// A disabled component contributes neither score nor weight, whatever the
/// attribute set contains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct MatchingCriteria {
    #[serde(alias = "titleMatching")]
    pub title_matching: bool,
    #[serde(alias = "brandMatching")]
    pub brand_matching: bool,
    #[serde(alias = "colorMatching")]
    pub color_matching: bool,
    #[serde(alias = "sizeMatching")]
    pub size_matching: bool,
    #[serde(alias = "specificationsMatching")]
    pub specifications_matching: bool,
}

impl Default for MatchingCriteria {
    fn default() -> Self {
        Self {
            title_matching: true,
            brand_matching: true,
            color_matching: true,
            size_matching: true,
            specifications_matching: true,
        }
    }
}

impl MatchingCriteria {
    /// All components enabled
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn without_title(mut self) -> Self {
        self.title_matching = false;
        self
    }

    #[must_use]
    pub fn without_brand(mut self) -> Self {
        self.brand_matching = false;
        self
    }

    #[must_use]
    pub fn without_color(mut self) -> Self {
        self.color_matching = false;
        self
    }

    #[must_use]
    pub fn without_size(mut self) -> Self {
        self.size_matching = false;
        self
    }

    #[must_use]
    pub fn without_specifications(mut self) -> Self {
        self.specifications_matching = false;
        self
    }
}

/// Full fuzzy matcher configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FuzzyConfig {
    pub weights: FuzzyWeights,
    /// Specification keys compared against titles (normalized before lookup)
    pub specification_keys: Vec<String>,
    /// Two size tokens match when their sequence ratio exceeds this value
    pub size_similarity_threshold: f32,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            weights: FuzzyWeights::default(),
            specification_keys: DEFAULT_SPECIFICATION_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            size_similarity_threshold: 0.8,
        }
    }
}

impl FuzzyConfig {
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if !(0.0..=1.0).contains(&self.size_similarity_threshold) {
            return Err(Error::InvalidConfig(format!(
                "size_similarity_threshold must be within [0, 1], got {}",
                self.size_similarity_threshold
            )));
        }
        Ok(())
    }
}

/// Lowercase, with `_` and `-` read as spaces and runs of whitespace collapsed
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
