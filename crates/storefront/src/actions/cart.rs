//! Cart reads and writes. The cart itself lives in the commerce service.

use futures::future::join_all;
use redis_shop_core::{CartEntry, Price, Product, ProductId};
use tracing::instrument;

use super::{ActionError, ApiResult};
use crate::api::CommerceApi;
use crate::middleware::SessionAccess;
use crate::view_cache::{CART_VIEW_PATH, ViewCache};

const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Successful add-to-cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartAdded {
    /// Confirmation from the service.
    pub message: String,
    /// Cart contents after the add.
    pub cart: Vec<CartEntry>,
}

/// A cart entry resolved to its product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
    pub line_total: Price,
}

/// Resolved cart lines and their total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub total: Price,
}

impl CartSummary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Add `quantity` (default 1) units of a product to the shopper's cart.
///
/// On success the shopper's cached cart view is dropped.
///
/// # Errors
///
/// "Not authenticated" without a session, a local message for a zero
/// quantity (neither reaches the service), or the service's message.
#[instrument(skip(api, session, views))]
pub async fn add_to_cart<A, S>(
    api: &A,
    session: &S,
    views: &ViewCache,
    product_id: ProductId,
    quantity: Option<u32>,
) -> ApiResult<CartAdded>
where
    A: CommerceApi,
    S: SessionAccess,
{
    let token = session
        .get()
        .ok_or_else(|| ActionError::new(NOT_AUTHENTICATED))?;

    let quantity = quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(ActionError::new("Quantity must be at least 1"));
    }

    let response = api
        .add_to_cart(&token, product_id, quantity)
        .await
        .map_err(|e| ActionError::from_api(&e, "Failed to add to cart"))?;

    views.invalidate(CART_VIEW_PATH, &token).await;

    Ok(CartAdded {
        message: response.message,
        cart: response.cart,
    })
}

/// Read the shopper's cart. Guests always get an empty cart.
///
/// # Errors
///
/// Returns the service's message when the cart cannot be read.
#[instrument(skip_all)]
pub async fn get_cart<A, S>(api: &A, session: &S) -> ApiResult<Vec<CartEntry>>
where
    A: CommerceApi,
    S: SessionAccess,
{
    let Some(token) = session.get() else {
        return Ok(Vec::new());
    };

    api.get_cart(&token)
        .await
        .map(|response| response.cart)
        .map_err(|e| ActionError::from_api(&e, "Failed to fetch cart"))
}

/// Resolve each cart entry's product concurrently and total the cart.
///
/// Entries are kept in cart order; one whose product fails to load is left
/// out of both the lines and the total.
pub async fn cart_lines<A: CommerceApi>(api: &A, entries: &[CartEntry]) -> CartSummary {
    let lookups = entries.iter().map(|entry| api.get_product(entry.product_id));

    let lines: Vec<CartLine> = join_all(lookups)
        .await
        .into_iter()
        .zip(entries)
        .filter_map(|(result, entry)| match result {
            Ok(product) => Some(CartLine {
                line_total: product.data.price.times(entry.quantity),
                product: product.data,
                quantity: entry.quantity,
            }),
            Err(e) => {
                tracing::warn!(product_id = %entry.product_id, error = %e, "Dropping cart line");
                None
            }
        })
        .collect();

    let total = lines.iter().map(|line| line.line_total).sum();
    CartSummary { lines, total }
}
