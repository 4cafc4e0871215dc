//! # PriceMatch Core
//!
//! Core types shared by every PriceMatch crate:
//!
//! - [`AttributeSet`] - Validated product attributes used as the ranking query
//! - [`ExtractedAttributes`] - Loose payload returned by feature extraction
//! - [`CatalogProduct`] / [`LiveListing`] - Read-only candidate records
//! - [`Vector`] - Dense embedding vector with checked cosine similarity
//! - [`text`] - Deterministic text synthesis for embedding input
//!
//! ## Example
//!
//! ```rust
//! use pricematch_core::{AttributeSet, text::synthesize_attributes};
//!
//! let attrs = AttributeSet::new("string lights", "lighting")
//!     .unwrap()
//!     .with_brand("Brightown")
//!     .with_color("warm white");
//!
//! assert_eq!(
//!     synthesize_attributes(&attrs),
//!     "Type: string lights Category: lighting Brand: Brightown Color: warm white"
//! );
//! ```

pub mod attributes;
pub mod error;
pub mod product;
pub mod text;
pub mod vector;

pub use attributes::{infer_category, spec_value_text, AttributeSet, ExtractedAttributes, DEFAULT_CATEGORY};
pub use error::{Error, ProviderError, Result};
pub use product::{Candidate, CatalogProduct, LiveListing, ProductId};
pub use vector::Vector;
