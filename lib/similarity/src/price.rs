//! Price competitiveness scoring
//!
//! Scores one price against the prices of the other candidates in the same
//! request, detects multi-pack listings and derives unit prices.

use pricematch_core::{Error, LiveListing, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Score returned when there is nothing to compare against
pub const NEUTRAL_PRICE_SCORE: f32 = 0.5;

/// Shape of the price curve.
///
/// With `n` the price's position between the cheapest (0) and the most
/// expensive (1) candidate, the score is `1 - floor_span * n^exponent`.
/// Defaults map the cheapest to 1.0 and the most expensive to 0.5; an
/// exponent below 1 flattens the gap between the very cheapest listings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PriceCurve {
    pub exponent: f32,
    pub floor_span: f32,
}

impl Default for PriceCurve {
    fn default() -> Self {
        Self {
            exponent: 0.7,
            floor_span: 0.5,
        }
    }
}

impl PriceCurve {
    pub fn validate(&self) -> Result<()> {
        if !self.exponent.is_finite() || self.exponent <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "price curve exponent must be positive, got {}",
                self.exponent
            )));
        }
        if !(self.floor_span > 0.0 && self.floor_span <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "price curve floor_span must be within (0, 1], got {}",
                self.floor_span
            )));
        }
        Ok(())
    }
}

/// Which price a listing is compared on
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PriceBasis {
    /// The listed price of the whole offer
    #[default]
    Listed,
    /// Price per item for multi-packs, listed price otherwise
    Unit,
}

#[derive(Debug, Clone, Default)]
pub struct PriceScorer {
    curve: PriceCurve,
}

impl PriceScorer {
    pub fn new(curve: PriceCurve) -> Result<Self> {
        curve.validate()?;
        Ok(Self { curve })
    }

    pub fn curve(&self) -> PriceCurve {
        self.curve
    }

    /// Competitiveness of `price` within `all_prices`, in [0, 1].
    ///
    /// Lower is better. Empty comparison set gives the neutral 0.5; a set of
    /// identical prices gives 1.0 to everyone.
    pub fn score(&self, price: f64, all_prices: &[f64]) -> f32 {
        match PriceRange::of(all_prices) {
            None => NEUTRAL_PRICE_SCORE,
            Some(range) => self.score_in(price, range),
        }
    }

    /// Score every entry against the priced entries of the same slice.
    ///
    /// Entries without a price get the neutral score.
    pub fn score_all(&self, prices: &[Option<f64>]) -> Vec<f32> {
        let known: Vec<f64> = prices.iter().flatten().copied().collect();
        let range = PriceRange::of(&known);
        prices
            .iter()
            .map(|price| match (price, range) {
                (Some(p), Some(r)) => self.score_in(*p, r),
                _ => NEUTRAL_PRICE_SCORE,
            })
            .collect()
    }

    fn score_in(&self, price: f64, range: PriceRange) -> f32 {
        let span = range.max - range.min;
        if span <= 0.0 {
            return 1.0;
        }
        let normalized = ((price - range.min) / span).clamp(0.0, 1.0) as f32;
        1.0 - self.curve.floor_span * normalized.powf(self.curve.exponent)
    }
}

#[derive(Debug, Clone, Copy)]
struct PriceRange {
    min: f64,
    max: f64,
}

impl PriceRange {
    fn of(prices: &[f64]) -> Option<Self> {
        let mut iter = prices.iter().copied().filter(|p| p.is_finite());
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }
}

/// Pack quantity and derived unit price for one listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PackInfo {
    pub pack_quantity: Option<u32>,
    pub unit_price: Option<f64>,
}

impl PackInfo {
    pub fn from_title(title: &str, price: Option<f64>) -> Self {
        let pack_quantity = detect_pack_quantity(title);
        let unit_price = match (pack_quantity, price) {
            (Some(q), Some(p)) => Some(p / f64::from(q)),
            _ => None,
        };
        Self {
            pack_quantity,
            unit_price,
        }
    }

    /// Price on the requested basis
    pub fn basis_price(&self, price: Option<f64>, basis: PriceBasis) -> Option<f64> {
        match basis {
            PriceBasis::Listed => price,
            PriceBasis::Unit => self.unit_price.or(price),
        }
    }
}

fn pack_regex() -> &'static Regex {
    static PACK_RE: OnceLock<Regex> = OnceLock::new();
    PACK_RE.get_or_init(|| Regex::new(r"(?i)\b(\d+)\s*-\s*pack\b").expect("pack pattern is valid"))
}

fn number_regex() -> &'static Regex {
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    NUMBER_RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is valid"))
}

/// Quantity from an "N-pack" marker in a title, if positive
pub fn detect_pack_quantity(title: &str) -> Option<u32> {
    pack_regex()
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|q| *q > 0)
}

/// First number in a displayed price such as "$1,299.99" or "From 24.00 USD"
pub fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    number_regex()
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|p| p.is_finite())
}

/// Numeric price of a listing: the provider's parsed value first, then the text
pub fn listing_price(listing: &LiveListing) -> Option<f64> {
    listing
        .extracted_price
        .filter(|p| p.is_finite() && *p >= 0.0)
        .or_else(|| listing.raw_price_text.as_deref().and_then(parse_price_text))
}
