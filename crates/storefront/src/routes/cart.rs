//! Cart route handlers.
//!
//! The cart lives in the commerce service; these handlers only read it and
//! forward additions. With the view cache enabled, a rendered cart page is
//! reused until the shopper adds something.

use askama::Template;
use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use redis_shop_core::ProductId;
use serde::{Deserialize, Deserializer};
use tracing::instrument;

use crate::actions::{self, CartLine, CartSummary, Navigation};
use crate::error::Result;
use crate::middleware::{CookieSession, SessionAccess};
use crate::state::AppState;
use crate::view_cache::CART_VIEW_PATH;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.product.id,
            name: line.product.name.clone(),
            price: line.product.price.display(),
            quantity: line.quantity,
            line_total: line.line_total.display(),
        }
    }
}

/// Cart page template.
#[derive(Template)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub error: Option<String>,
}

impl From<&CartSummary> for CartShowTemplate {
    fn from(summary: &CartSummary) -> Self {
        Self {
            lines: summary.lines.iter().map(CartLineView::from).collect(),
            total: summary.total.display(),
            error: None,
        }
    }
}

/// Deserialize a cleared number input as None.
fn empty_string_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    /// Omitted or blank means one.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub quantity: Option<u32>,
}

/// Display the cart page.
///
/// # Errors
///
/// Returns an error if the page template fails to render.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    mut session: CookieSession,
) -> Result<Response> {
    if actions::current_user(state.api(), &mut session).await.is_none() {
        return Ok((session, Navigation::Login).into_response());
    }

    let token = session.get();
    if let Some(token) = &token
        && let Some(html) = state.views().get(CART_VIEW_PATH, token).await
    {
        return Ok((session, Html(html)).into_response());
    }

    let template = match actions::get_cart(state.api(), &session).await {
        Ok(entries) => CartShowTemplate::from(&actions::cart_lines(state.api(), &entries).await),
        Err(e) => CartShowTemplate {
            lines: Vec::new(),
            total: String::new(),
            error: Some(e.message().to_string()),
        },
    };
    let html = template.render()?;

    if template.error.is_none()
        && let Some(token) = &token
    {
        state
            .views()
            .insert(CART_VIEW_PATH, token, html.clone())
            .await;
    }

    Ok((session, Html(html)).into_response())
}

/// Add an item to the cart and go back to its product page with a notice.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: CookieSession,
    Form(form): Form<AddToCartForm>,
) -> Redirect {
    let product_id = ProductId::new(form.product_id);

    let notice = match actions::add_to_cart(
        state.api(),
        &session,
        state.views(),
        product_id,
        form.quantity,
    )
    .await
    {
        Ok(added) => format!("added={}", urlencoding::encode(&added.message)),
        Err(e) => format!("error={}", urlencoding::encode(e.message())),
    };

    Redirect::to(&format!("/product/{product_id}?{notice}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::extract::{FromRequest, Request};
    use axum::http::header;

    use super::*;

    async fn parse(body: &'static str) -> AddToCartForm {
        let request = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        let Form(form) = Form::<AddToCartForm>::from_request(request, &())
            .await
            .unwrap();
        form
    }

    #[tokio::test]
    async fn test_quantity_is_parsed() {
        let form = parse("product_id=7&quantity=3").await;
        assert_eq!(form.product_id, 7);
        assert_eq!(form.quantity, Some(3));
    }

    #[tokio::test]
    async fn test_blank_or_missing_quantity_is_none() {
        assert_eq!(parse("product_id=7&quantity=").await.quantity, None);
        assert_eq!(parse("product_id=7").await.quantity, None);
    }

    #[tokio::test]
    async fn test_non_numeric_quantity_is_rejected() {
        let request = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("product_id=7&quantity=lots"))
            .unwrap();
        assert!(Form::<AddToCartForm>::from_request(request, &()).await.is_err());
    }
}
