//! Product and homepage reads. No session required.

use futures::future::join_all;
use redis_shop_core::{HomepageContent, Product, ProductId, Sourced};
use tracing::instrument;

use super::{ActionError, ApiResult};
use crate::api::CommerceApi;

/// Look up one product, keeping the provenance tag.
///
/// # Errors
///
/// Returns the service's message, e.g. "HTTP 404" for an unknown id.
#[instrument(skip(api))]
pub async fn get_product<A: CommerceApi>(api: &A, id: ProductId) -> ApiResult<Sourced<Product>> {
    api.get_product(id)
        .await
        .map_err(|e| ActionError::from_api(&e, "Failed to fetch product"))
}

/// Fetch homepage banners and featured ids, keeping the provenance tag.
///
/// # Errors
///
/// Returns the service's message when the homepage cannot be fetched.
#[instrument(skip(api))]
pub async fn get_homepage<A: CommerceApi>(api: &A) -> ApiResult<Sourced<HomepageContent>> {
    api.get_homepage()
        .await
        .map_err(|e| ActionError::from_api(&e, "Failed to fetch homepage"))
}

/// Resolve featured product ids concurrently, in order.
///
/// A product that fails to load is left out.
pub async fn featured_products<A: CommerceApi>(api: &A, ids: &[ProductId]) -> Vec<Product> {
    let lookups = ids.iter().map(|&id| api.get_product(id));

    join_all(lookups)
        .await
        .into_iter()
        .zip(ids)
        .filter_map(|(result, id)| match result {
            Ok(product) => Some(product.data),
            Err(e) => {
                tracing::warn!(product_id = %id, error = %e, "Dropping featured product");
                None
            }
        })
        .collect()
}
