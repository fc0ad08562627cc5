//! Catalog types returned by the commerce service.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product as served by the commerce service.
///
/// Fetched fresh on every read; the storefront never caches or edits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub stock: u32,
}

impl Product {
    /// Whether at least one unit can be ordered.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Homepage content: promotional banners and featured product ids, in
/// display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomepageContent {
    pub banners: Vec<String>,
    pub featured: Vec<ProductId>,
}

/// A value together with the service's provenance tag.
///
/// `source` says where the service got the value from (for example its cache
/// or its database). It is opaque here and passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub source: String,
    pub data: T,
}
