//! Cart types.
//!
//! The authoritative cart lives in the commerce service; these are just the
//! entries it reports back.

use serde::{Deserialize, Serialize};

use super::ProductId;

/// One entry of a remote cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(rename = "pid")]
    pub product_id: ProductId,
    #[serde(rename = "qty")]
    pub quantity: u32,
}
