//! External collaborators of the engine
//!
//! Feature extraction and live search are remote services reached through
//! async traits; the catalog is a synchronous read-only store.

use async_trait::async_trait;
use pricematch_core::{CatalogProduct, ExtractedAttributes, LiveListing, ProductId, ProviderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Turns a free-text description or an image into product attributes
#[async_trait]
pub trait FeatureExtractor: Send + Sync {
    fn name(&self) -> &str;

    async fn extract_from_text(&self, text: &str) -> std::result::Result<ExtractedAttributes, ProviderError>;

    async fn extract_from_image(
        &self,
        image_base64: &str,
    ) -> std::result::Result<ExtractedAttributes, ProviderError>;
}

/// One live shopping search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub location: String,
    pub language: String,
    pub country: String,
    /// Number of listings wanted
    pub num: usize,
}

/// Live shopping search; an empty result is not an error
#[async_trait]
pub trait LiveSearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Listings in provider order
    async fn search(&self, request: &SearchRequest) -> std::result::Result<Vec<LiveListing>, ProviderError>;
}

/// Catalog lookup filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    /// Exact, case-insensitive
    pub category: Option<String>,
    /// Case-insensitive substring of the product type
    pub product_type: Option<String>,
}

impl CatalogFilter {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            product_type: None,
        }
    }

    pub fn matches(&self, product: &CatalogProduct) -> bool {
        if let Some(category) = &self.category {
            if product.category.to_lowercase() != category.to_lowercase() {
                return false;
            }
        }
        if let Some(product_type) = &self.product_type {
            if !product
                .product_type
                .to_lowercase()
                .contains(&product_type.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Read-only product catalog
pub trait CatalogStore: Send + Sync {
    /// All products passing `filter`, in catalog order
    fn products(&self, filter: &CatalogFilter) -> Result<Vec<CatalogProduct>>;

    fn product(&self, id: &ProductId) -> Result<Option<CatalogProduct>>;
}

/// Catalog held in memory, typically loaded from a JSON array
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<CatalogProduct>,
    by_id: HashMap<ProductId, usize>,
}

impl InMemoryCatalog {
    /// Later records replace earlier ones with the same id
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        let mut catalog = Self::default();
        for product in products {
            match catalog.by_id.get(&product.id) {
                Some(&idx) => catalog.products[idx] = product,
                None => {
                    catalog.by_id.insert(product.id.clone(), catalog.products.len());
                    catalog.products.push(product);
                }
            }
        }
        catalog
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let products: Vec<CatalogProduct> = serde_json::from_str(json)?;
        Ok(Self::new(products))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Case-insensitive substring search over the descriptive fields
    pub fn search_text(&self, query: &str) -> Vec<&CatalogProduct> {
        let query = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| {
                let searchable = [
                    p.name.as_str(),
                    p.category.as_str(),
                    p.product_type.as_str(),
                    p.brand.as_deref().unwrap_or(""),
                    p.color.as_deref().unwrap_or(""),
                    p.style.as_deref().unwrap_or(""),
                    p.description.as_str(),
                    p.key_features.join(" ").as_str(),
                ]
                .join(" ")
                .to_lowercase();
                searchable.contains(&query)
            })
            .collect()
    }
}

impl CatalogStore for InMemoryCatalog {
    fn products(&self, filter: &CatalogFilter) -> Result<Vec<CatalogProduct>> {
        Ok(self
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    fn product(&self, id: &ProductId) -> Result<Option<CatalogProduct>> {
        Ok(self.by_id.get(id).map(|&idx| self.products[idx].clone()))
    }
}
