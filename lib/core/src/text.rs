//! Text synthesis
//!
//! Projects attributes or catalog records into the single descriptive string
//! that is embedded for semantic similarity. Output depends only on field
//! values, so equal inputs always hit the same embedding cache entry.

use crate::attributes::{spec_value_text, AttributeSet};
use crate::product::CatalogProduct;
use serde_json::Value;
use std::collections::BTreeMap;

struct TextBuilder {
    parts: Vec<String>,
}

impl TextBuilder {
    fn new() -> Self {
        Self { parts: Vec::with_capacity(10) }
    }

    fn field(&mut self, label: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.parts.push(format!("{}: {}", label, v));
        }
        self
    }

    fn list(&mut self, label: &str, items: &[String]) -> &mut Self {
        let items: Vec<&str> = items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if !items.is_empty() {
            self.parts.push(format!("{}: {}", label, items.join(", ")));
        }
        self
    }

    fn specifications(&mut self, specs: &BTreeMap<String, Value>) -> &mut Self {
        let rendered: Vec<String> = specs
            .iter()
            .filter(|(key, _)| !key.trim().is_empty())
            .filter_map(|(key, value)| {
                spec_value_text(value).map(|v| format!("{}: {}", key.trim(), v))
            })
            .collect();
        if !rendered.is_empty() {
            self.parts
                .push(format!("Specifications: {}", rendered.join(", ")));
        }
        self
    }

    fn finish(&self) -> String {
        self.parts.join(" ")
    }
}

/// Descriptive text for a query attribute set
pub fn synthesize_attributes(attrs: &AttributeSet) -> String {
    TextBuilder::new()
        .field("Type", Some(attrs.product_type()))
        .field("Category", Some(attrs.category()))
        .field("Brand", attrs.brand())
        .field("Color", attrs.color())
        .field("Size", attrs.size())
        .field("Material", attrs.material())
        .field("Style", attrs.style())
        .list("Features", attrs.key_features())
        .specifications(attrs.specifications())
        .finish()
}

/// Descriptive text for a catalog record, led by its name
pub fn synthesize_product(product: &CatalogProduct) -> String {
    TextBuilder::new()
        .field("Product", Some(product.name.as_str()))
        .field("Type", Some(product.product_type.as_str()))
        .field("Category", Some(product.category.as_str()))
        .field("Brand", product.brand.as_deref())
        .field("Color", product.color.as_deref())
        .field("Size", product.size.as_deref())
        .field("Material", product.material.as_deref())
        .field("Style", product.style.as_deref())
        .list("Features", &product.key_features)
        .specifications(&product.specifications)
        .field("Description", Some(product.description.as_str()))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lights() -> AttributeSet {
        AttributeSet::new("string lights", "lighting")
            .unwrap()
            .with_brand("Brightown")
            .with_color("warm white")
            .with_key_features(["waterproof", "dimmable"])
            .with_specification("length", "50 ft")
            .with_specification("bulb_count", 25)
    }

    #[test]
    fn test_field_order_and_format() {
        let text = synthesize_attributes(&lights());
        assert_eq!(
            text,
            "Type: string lights Category: lighting Brand: Brightown Color: warm white \
             Features: waterproof, dimmable Specifications: bulb_count: 25, length: 50 ft"
        );
    }

    #[test]
    fn test_missing_fields_omitted() {
        let attrs = AttributeSet::new("lamp", "lighting").unwrap();
        assert_eq!(synthesize_attributes(&attrs), "Type: lamp Category: lighting");
    }

    #[test]
    fn test_identical_sets_identical_text() {
        // Specification insertion order differs; output must not.
        let a = AttributeSet::new("bulb", "lighting")
            .unwrap()
            .with_specification("wattage", 9)
            .with_specification("base", "E26");
        let b = AttributeSet::new("bulb", "lighting")
            .unwrap()
            .with_specification("base", "E26")
            .with_specification("wattage", 9);
        assert_eq!(synthesize_attributes(&a), synthesize_attributes(&b));
        assert_eq!(synthesize_attributes(&lights()), synthesize_attributes(&lights()));
    }

    #[test]
    fn test_product_text_includes_description() {
        let mut product = CatalogProduct::new(1u64, "Edison Lights", 39.99, "lighting", "string lights");
        product.brand = Some("RetroLite".to_string());
        product.color = Some(String::new());
        product.description = "Vintage bulbs".to_string();

        assert_eq!(
            synthesize_product(&product),
            "Product: Edison Lights Type: string lights Category: lighting Brand: RetroLite \
             Description: Vintage bulbs"
        );
    }
}
