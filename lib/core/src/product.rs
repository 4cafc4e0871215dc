use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a catalog product
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Integer(u64),
    String(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Integer(i) => write!(f, "{}", i),
            ProductId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        ProductId::Integer(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId::String(id.to_string())
    }
}

/// A product record owned by the catalog store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: String,
    pub category: String,
    pub product_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, Value>,
    #[serde(default)]
    pub description: String,
}

impl CatalogProduct {
    /// Minimal record; descriptive fields default to empty
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: f64,
        category: impl Into<String>,
        product_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image_url: String::new(),
            category: category.into(),
            product_type: product_type.into(),
            brand: None,
            color: None,
            size: None,
            material: None,
            style: None,
            key_features: Vec::new(),
            specifications: BTreeMap::new(),
            description: String::new(),
        }
    }
}

/// A raw listing returned by a live shopping search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveListing {
    pub title: String,
    /// Price as displayed by the source, e.g. "$1,299.99"
    #[serde(default, alias = "price", skip_serializing_if = "Option::is_none")]
    pub raw_price_text: Option<String>,
    /// Numeric price when the search provider already parsed one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_price: Option<f64>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<String>,
    #[serde(default)]
    pub position: u32,
}

impl LiveListing {
    pub fn new(title: impl Into<String>, raw_price_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            raw_price_text: Some(raw_price_text.into()),
            extracted_price: None,
            source: String::new(),
            link: String::new(),
            product_link: None,
            thumbnail: None,
            rating: None,
            reviews: None,
            shipping: None,
            position: 0,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>, link: impl Into<String>) -> Self {
        self.source = source.into();
        self.link = link.into();
        self
    }
}

/// Anything that can be ranked: exposes what the category filter reads
pub trait Candidate {
    fn category(&self) -> Option<&str>;
}

impl Candidate for CatalogProduct {
    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
}

impl Candidate for LiveListing {
    fn category(&self) -> Option<&str> {
        None
    }
}
