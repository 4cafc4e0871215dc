//! Product attribute model
//!
//! [`AttributeSet`] is the validated query shape used by every scorer.
//! [`ExtractedAttributes`] is the loose payload an extraction provider hands
//! back, where any field may be missing.

use crate::{Error, Result};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Category used when neither the provider nor the keyword table yields one
pub const DEFAULT_CATEGORY: &str = "home goods";

/// Normalized structured description of a product.
///
/// `product_type` and `category` are always non-empty. Optional fields are
/// trimmed and never hold empty strings. Specifications live in an ordered
/// map so that two sets with the same content iterate identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExtractedAttributes")]
pub struct AttributeSet {
    brand: Option<String>,
    model: Option<String>,
    product_type: String,
    color: Option<String>,
    size: Option<String>,
    material: Option<String>,
    style: Option<String>,
    category: String,
    key_features: Vec<String>,
    specifications: BTreeMap<String, Value>,
}

impl AttributeSet {
    pub fn new(product_type: impl Into<String>, category: impl Into<String>) -> Result<Self> {
        let product_type = clean(Some(product_type.into()))
            .ok_or(Error::MissingRequiredAttribute("product_type"))?;
        let category =
            clean(Some(category.into())).ok_or(Error::MissingRequiredAttribute("category"))?;

        Ok(Self {
            brand: None,
            model: None,
            product_type,
            color: None,
            size: None,
            material: None,
            style: None,
            category,
            key_features: Vec::new(),
            specifications: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = clean(Some(brand.into()));
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = clean(Some(model.into()));
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = clean(Some(color.into()));
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = clean(Some(size.into()));
        self
    }

    #[must_use]
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = clean(Some(material.into()));
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = clean(Some(style.into()));
        self
    }

    #[must_use]
    pub fn with_key_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_features = union_features(Vec::new(), features.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_specification(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        if !key.trim().is_empty() && !value.is_null() {
            self.specifications.insert(key.trim().to_string(), value);
        }
        self
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn product_type(&self) -> &str {
        &self.product_type
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn key_features(&self) -> &[String] {
        &self.key_features
    }

    pub fn specifications(&self) -> &BTreeMap<String, Value> {
        &self.specifications
    }

    /// Combine two extraction results.
    ///
    /// `self` takes precedence: each optional field of `other` is used only
    /// where `self` has none. Key features are unioned, keeping the order in
    /// which they first appear. Specification keys missing from `self` are
    /// copied from `other`.
    #[must_use]
    pub fn merge(self, other: &AttributeSet) -> AttributeSet {
        AttributeSet {
            brand: self.brand.or_else(|| other.brand.clone()),
            model: self.model.or_else(|| other.model.clone()),
            product_type: self.product_type,
            color: self.color.or_else(|| other.color.clone()),
            size: self.size.or_else(|| other.size.clone()),
            material: self.material.or_else(|| other.material.clone()),
            style: self.style.or_else(|| other.style.clone()),
            category: self.category,
            key_features: union_features(self.key_features, other.key_features.iter().cloned()),
            specifications: merge_specifications(self.specifications, &other.specifications),
        }
    }
}

/// Raw attributes as returned by a feature extraction provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAttributes {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_features: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub specifications: BTreeMap<String, Value>,
}

impl ExtractedAttributes {
    /// Same precedence rule as [`AttributeSet::merge`], applied before
    /// validation so a required field may come from either source.
    #[must_use]
    pub fn merge(self, other: ExtractedAttributes) -> ExtractedAttributes {
        ExtractedAttributes {
            brand: fill(self.brand, other.brand),
            model: fill(self.model, other.model),
            product_type: fill(self.product_type, other.product_type),
            color: fill(self.color, other.color),
            size: fill(self.size, other.size),
            material: fill(self.material, other.material),
            style: fill(self.style, other.style),
            category: fill(self.category, other.category),
            key_features: union_features(self.key_features, other.key_features),
            specifications: merge_specifications(self.specifications, &other.specifications),
        }
    }

    /// Validate into an [`AttributeSet`], inferring a category from the
    /// product type when the provider left it out.
    pub fn into_attribute_set(mut self) -> Result<AttributeSet> {
        if clean(self.category.clone()).is_none() {
            if let Some(product_type) = clean(self.product_type.clone()) {
                self.category = Some(infer_category(&product_type).to_string());
            }
        }
        AttributeSet::try_from(self)
    }
}

impl TryFrom<ExtractedAttributes> for AttributeSet {
    type Error = Error;

    fn try_from(raw: ExtractedAttributes) -> Result<Self> {
        let product_type =
            clean(raw.product_type).ok_or(Error::MissingRequiredAttribute("product_type"))?;
        let category = clean(raw.category).ok_or(Error::MissingRequiredAttribute("category"))?;

        Ok(AttributeSet {
            brand: clean(raw.brand),
            model: clean(raw.model),
            product_type,
            color: clean(raw.color),
            size: clean(raw.size),
            material: clean(raw.material),
            style: clean(raw.style),
            category,
            key_features: union_features(Vec::new(), raw.key_features),
            specifications: merge_specifications(BTreeMap::new(), &raw.specifications),
        })
    }
}

impl From<AttributeSet> for ExtractedAttributes {
    fn from(set: AttributeSet) -> Self {
        ExtractedAttributes {
            brand: set.brand,
            model: set.model,
            product_type: Some(set.product_type),
            color: set.color,
            size: set.size,
            material: set.material,
            style: set.style,
            category: Some(set.category),
            key_features: set.key_features,
            specifications: set.specifications,
        }
    }
}

/// Guess a category from keywords in the product type
pub fn infer_category(product_type: &str) -> &'static str {
    const TABLE: &[(&[&str], &str)] = &[
        (&["light", "lamp", "chandelier", "bulb"], "lighting"),
        (&["chair", "table", "sofa", "desk", "bed"], "furniture"),
        (&["tv", "phone", "computer", "laptop"], "electronics"),
    ];

    let lowered = product_type.to_lowercase();
    TABLE
        .iter()
        .find(|(terms, _)| terms.iter().any(|term| lowered.contains(term)))
        .map(|(_, category)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}

/// Render a specification value as plain text.
///
/// Strings are trimmed, numbers and booleans use their JSON spelling, arrays
/// are joined with ", ". Null and empty values render as `None`.
pub fn spec_value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(spec_value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == v.len() {
            Some(v)
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn fill(primary: Option<String>, secondary: Option<String>) -> Option<String> {
    clean(primary).or_else(|| clean(secondary))
}

fn union_features<I>(base: Vec<String>, extra: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: AHashSet<String> = AHashSet::with_capacity(base.len());
    let mut out = Vec::with_capacity(base.len());
    for feature in base.into_iter().chain(extra) {
        if let Some(feature) = clean(Some(feature)) {
            if seen.insert(feature.clone()) {
                out.push(feature);
            }
        }
    }
    out
}

fn merge_specifications(
    mut primary: BTreeMap<String, Value>,
    secondary: &BTreeMap<String, Value>,
) -> BTreeMap<String, Value> {
    primary.retain(|key, value| !key.trim().is_empty() && !value.is_null());
    for (key, value) in secondary {
        if key.trim().is_empty() || value.is_null() {
            continue;
        }
        primary.entry(key.clone()).or_insert_with(|| value.clone());
    }
    primary
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
