//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (commerce service reachable)
//! GET  /static/*               - Static assets
//!
//! # Auth
//! GET  /login                  - Login page (guests only)
//! POST /login                  - Login action (rate limited)
//! POST /logout                 - Logout action
//!
//! # Shop (requires a live session)
//! GET  /                       - Home page: banners and featured products
//! GET  /product/{id}           - Product detail
//! POST /cart/add               - Add to cart, redirects back to the product
//! GET  /cart                   - Cart page
//! ```
//!
//! The route guard redirects on cookie presence alone. Shop pages then
//! resolve the current user and send the visitor to `/login` when the
//! session turns out to be stale.

pub mod auth;
pub mod cart;
pub mod health;
pub mod home;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::Request,
    middleware::{from_fn, from_fn_with_state},
    response::Response,
    routing::{get, post},
};
use tower_http::{
    services::ServeDir,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{
    auth_rate_limiter, request_id_middleware, route_guard_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

/// Directory static assets are served from.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Not found page template.
#[derive(Template, WebTemplate)]
#[template(path = "errors/not_found.html")]
pub struct NotFoundTemplate {
    pub message: String,
}

async fn fallback() -> AppError {
    AppError::NotFound("Page not found".to_string())
}

/// Create the page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
        .route("/", get(home::home))
        .route("/product/{id}", get(products::show))
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
}

/// Build the complete application: routes, static files and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(fallback)
        .layer(from_fn_with_state(state.clone(), route_guard_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response, latency: std::time::Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
    use axum::response::IntoResponse;
    use axum_extra::extract::cookie::PrivateCookieJar;
    use secrecy::SecretString;
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::{ApiConfig, StorefrontConfig};
    use crate::middleware::{CookieSession, SessionAccess, SessionSettings, derive_key};

    const SECRET: &str = "kQ9#vL2$wX7!pR4@mZ8&tY1*nB5^cF3%";

    /// App whose commerce service is unreachable.
    fn offline_app() -> Router {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from(SECRET),
            api: ApiConfig {
                base_url: Url::parse("http://127.0.0.1:9").unwrap(),
            },
            view_cache_ttl: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        app(AppState::new(&config))
    }

    /// `Cookie` header value carrying a session for `token`.
    fn session_cookie(token: &str) -> HeaderValue {
        let key = derive_key(&SecretString::from(SECRET));
        let mut session = CookieSession::new(PrivateCookieJar::new(key), SessionSettings::default());
        session.set(SecretString::from(token));

        let response = (session, ()).into_response();
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        HeaderValue::from_str(set_cookie.split(';').next().unwrap()).unwrap()
    }

    async fn send(request: Request) -> (StatusCode, HeaderMap, String) {
        let response = offline_app().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get_request(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (status, _, body) = send(get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_readiness_fails_when_service_unreachable() {
        let (status, _, _) = send(get_request("/health/ready")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_guest_is_redirected_to_login() {
        for uri in ["/", "/cart", "/product/42", "/does-not-exist"] {
            let (status, headers, _) = send(get_request(uri)).await;
            assert_eq!(status, StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(headers[header::LOCATION], "/login", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_login_page_renders_for_guest() {
        let (status, headers, body) = send(get_request("/login")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Sign in"));
        assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_login_page_redirects_signed_in_visitor_home() {
        let request = Request::builder()
            .uri("/login")
            .header(header::COOKIE, session_cookie("tok-1"))
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = send(request).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_tampered_cookie_counts_as_guest() {
        let request = Request::builder()
            .uri("/cart")
            .header(header::COOKIE, "redis_shop_session=forged")
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = send(request).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_invalid_login_form_is_rejected_before_network() {
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-forwarded-for", "203.0.113.10")
            .body(Body::from("email=not-an-email&password=secret"))
            .unwrap();

        let (status, headers, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Invalid email address"));
        assert!(body.contains("value=\"not-an-email\""));
        assert!(!headers.contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn test_service_outage_on_login_shows_fallback() {
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-forwarded-for", "203.0.113.11")
            .body(Body::from("email=user%40example.com&password=password123"))
            .unwrap();

        let (status, _, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Login failed"));
    }

    #[tokio::test]
    async fn test_login_without_password_field_rerenders_form() {
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-forwarded-for", "203.0.113.12")
            .body(Body::from("email=user%40example.com"))
            .unwrap();

        let (status, headers, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Password is required"));
        assert!(body.contains("value=\"user@example.com\""));
        assert!(!headers.contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn test_blank_quantity_reaches_add_to_cart() {
        let request = Request::builder()
            .method("POST")
            .uri("/cart/add")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::COOKIE, session_cookie("tok-1"))
            .body(Body::from("product_id=7&quantity="))
            .unwrap();

        // Service unreachable: the add fails, but the form itself is accepted.
        let (status, headers, _) = send(request).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(
            headers[header::LOCATION],
            "/product/7?error=Failed%20to%20add%20to%20cart"
        );
    }

    #[tokio::test]
    async fn test_unknown_page_renders_not_found_for_signed_in_visitor() {
        let request = Request::builder()
            .uri("/does-not-exist")
            .header(header::COOKIE, session_cookie("tok-1"))
            .body(Body::empty())
            .unwrap();

        let (status, _, body) = send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Page not found"));
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let request = Request::builder()
            .method("POST")
            .uri("/logout")
            .header(header::COOKIE, session_cookie("tok-1"))
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = send(request).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/login");
        let cleared = headers[header::SET_COOKIE].to_str().unwrap();
        assert!(cleared.starts_with("redis_shop_session="));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_stale_session_is_cleared_on_shop_page() {
        // Service unreachable: the current-user lookup fails and self-heals.
        let request = Request::builder()
            .uri("/cart")
            .header(header::COOKIE, session_cookie("tok-1"))
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = send(request).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/login");
        assert!(
            headers[header::SET_COOKIE]
                .to_str()
                .unwrap()
                .contains("Max-Age=0")
        );
    }

    #[tokio::test]
    async fn test_static_assets_bypass_guard() {
        let (status, headers, _) = send(get_request("/static/css/main.css")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            headers[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/css")
        );
    }
}
