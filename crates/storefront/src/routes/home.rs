//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use super::products::ProductView;
use crate::actions::{self, Navigation};
use crate::api::CommerceApi;
use crate::middleware::CookieSession;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub banners: Vec<String>,
    pub featured: Vec<ProductView>,
    /// Provenance tag of the homepage content.
    pub source: String,
    pub error: Option<String>,
}

impl HomeTemplate {
    fn failed(message: &str) -> Self {
        Self {
            banners: Vec::new(),
            featured: Vec::new(),
            source: String::new(),
            error: Some(message.to_string()),
        }
    }
}

/// Homepage content with its featured ids resolved to products.
async fn home_template<A: CommerceApi>(api: &A) -> HomeTemplate {
    match actions::get_homepage(api).await {
        Ok(homepage) => {
            let featured = actions::featured_products(api, &homepage.data.featured).await;
            HomeTemplate {
                banners: homepage.data.banners,
                featured: featured.iter().map(ProductView::from).collect(),
                source: homepage.source,
                error: None,
            }
        }
        Err(e) => HomeTemplate::failed(e.message()),
    }
}

/// Display the home page: banners and featured products.
#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, mut session: CookieSession) -> Response {
    if actions::current_user(state.api(), &mut session).await.is_none() {
        return (session, Navigation::Login).into_response();
    }

    let template = home_template(state.api()).await;

    (session, template).into_response()
}
