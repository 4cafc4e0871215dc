//! Engine configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes. `validate` runs on load and again when the engine is built.

use pricematch_core::{Error, Result};
use pricematch_embedding::EmbeddingCacheConfig;
use pricematch_similarity::{FuzzyConfig, PriceCurve};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub embedding: EmbeddingCacheConfig,
    pub extraction: ExtractionConfig,
    pub fuzzy: FuzzyConfig,
    pub price: PriceCurve,
    pub live: LiveConfig,
    pub catalog: CatalogDefaults,
}

/// Feature extraction call settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub timeout_ms: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { timeout_ms: 30_000 }
    }
}

/// Live shopping search settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LiveConfig {
    /// Listings must match strictly above this fuzzy score
    pub min_match_score: f32,
    pub location: String,
    pub language: String,
    pub country: String,
    /// Listings fetched per requested result, to leave room for filtering
    pub result_multiplier: usize,
    /// Hard cap on listings requested from the provider
    pub max_fetch: usize,
    pub timeout_ms: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            min_match_score: 0.3,
            location: "Austin, Texas, United States".to_string(),
            language: "en".to_string(),
            country: "us".to_string(),
            result_multiplier: 2,
            max_fetch: 20,
            timeout_ms: 15_000,
        }
    }
}

impl LiveConfig {
    /// Number of listings to request for `max_results` final results
    pub fn fetch_count(&self, max_results: usize) -> usize {
        max_results
            .saturating_mul(self.result_multiplier)
            .min(self.max_fetch)
    }
}

/// Defaults for catalog ranking requests
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogDefaults {
    pub price_weight: f32,
    pub similarity_weight: f32,
    pub max_results: usize,
}

impl Default for CatalogDefaults {
    fn default() -> Self {
        Self {
            price_weight: 0.3,
            similarity_weight: 0.7,
            max_results: 10,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.embedding.validate()?;
        self.fuzzy.validate()?;
        self.price.validate()?;

        if self.extraction.timeout_ms == 0 {
            return Err(invalid("extraction.timeout_ms must be greater than zero"));
        }

        let live = &self.live;
        if !(0.0..=1.0).contains(&live.min_match_score) {
            return Err(invalid(format!(
                "live.min_match_score must be within [0, 1], got {}",
                live.min_match_score
            )));
        }
        if live.result_multiplier == 0 || live.max_fetch == 0 {
            return Err(invalid("live.result_multiplier and live.max_fetch must be at least 1"));
        }
        if live.timeout_ms == 0 {
            return Err(invalid("live.timeout_ms must be greater than zero"));
        }

        let catalog = &self.catalog;
        for (name, weight) in [
            ("catalog.price_weight", catalog.price_weight),
            ("catalog.similarity_weight", catalog.similarity_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(invalid(format!("{} must be non-negative, got {}", name, weight)));
            }
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidConfig(message.into())
}
