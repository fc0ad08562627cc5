//! Product detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use redis_shop_core::{Product, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::actions::{self, Navigation};
use crate::error::AppError;
use crate::middleware::CookieSession;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub stock: u32,
    pub in_stock: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price.display(),
            stock: product.stock,
            in_stock: product.in_stock(),
        }
    }
}

/// Notices carried back from the add-to-cart redirect.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub added: Option<String>,
    pub error: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
    /// Provenance tag of the product data.
    pub source: String,
    pub added: Option<String>,
    pub error: Option<String>,
}

/// Display a product, or the not found page when it cannot be loaded.
#[instrument(skip(state, session, query))]
pub async fn show(
    State(state): State<AppState>,
    mut session: CookieSession,
    Path(id): Path<String>,
    Query(query): Query<NoticeQuery>,
) -> Response {
    if actions::current_user(state.api(), &mut session).await.is_none() {
        return (session, Navigation::Login).into_response();
    }

    let Ok(id) = id.parse::<ProductId>() else {
        return (session, AppError::NotFound("Product not found".to_string())).into_response();
    };

    match actions::get_product(state.api(), id).await {
        Ok(product) => {
            let template = ProductShowTemplate {
                product: ProductView::from(&product.data),
                source: product.source,
                added: query.added,
                error: query.error,
            };
            (session, template).into_response()
        }
        Err(e) => (session, AppError::NotFound(e.message().to_string())).into_response(),
    }
}
