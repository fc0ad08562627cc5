//! HTTP implementation of [`CommerceApi`] using `reqwest`.

use std::sync::Arc;

use redis_shop_core::{HomepageContent, Product, ProductId, Sourced};
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::types::{ErrorBody, LoginRequest};
use super::{ApiError, CartAddResponse, CartResponse, CommerceApi, LoginResponse, MeResponse};
use crate::config::ApiConfig;

/// Placeholder message when an error body cannot be parsed at all.
const UNPARSABLE_ERROR_MESSAGE: &str = "Unknown error";

/// Client for the remote commerce service.
///
/// Cheap to clone; all clones share one connection pool. Holds no state beyond
/// the base URL.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new commerce service client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Check that the service answers at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or answers with a
    /// non-success status.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), ApiError> {
        self.send::<serde_json::Value>(self.request(Method::GET, "/", None))
            .await
            .map(|_| ())
    }

    /// Start a request to `endpoint`.
    ///
    /// Every request declares a JSON content type and opts out of caching.
    /// The bearer header is only attached when a token is given.
    fn request(
        &self,
        method: Method,
        endpoint: &str,
        token: Option<&SecretString>,
    ) -> RequestBuilder {
        let url = format!("{}{endpoint}", self.inner.base_url);
        let builder = self
            .inner
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(CACHE_CONTROL, "no-store");

        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and decode a success body as `T`.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body).map_or_else(
                |_| UNPARSABLE_ERROR_MESSAGE.to_string(),
                |error| error.message().unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            );

            tracing::warn!(
                status = %status,
                message = %message,
                "Commerce service returned non-success status"
            );
            return Err(ApiError::Remote { status, message });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse commerce service response"
            );
            ApiError::Decode(e)
        })
    }
}

impl CommerceApi for ApiClient {
    #[instrument(skip(self, password))]
    async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        self.send(self.request(Method::POST, "/login", None).json(&body))
            .await
    }

    #[instrument(skip(self, token))]
    async fn get_me(&self, token: &SecretString) -> Result<MeResponse, ApiError> {
        self.send(self.request(Method::GET, "/me", Some(token)))
            .await
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<Sourced<Product>, ApiError> {
        self.send(self.request(Method::GET, &format!("/product/{id}"), None))
            .await
    }

    #[instrument(skip(self))]
    async fn get_homepage(&self) -> Result<Sourced<HomepageContent>, ApiError> {
        self.send(self.request(Method::GET, "/homepage", None))
            .await
    }

    #[instrument(skip(self, token))]
    async fn add_to_cart(
        &self,
        token: &SecretString,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartAddResponse, ApiError> {
        let endpoint = format!("/cart/add?pid={product_id}&qty={quantity}");
        self.send(self.request(Method::POST, &endpoint, Some(token)))
            .await
    }

    #[instrument(skip(self, token))]
    async fn get_cart(&self, token: &SecretString) -> Result<CartResponse, ApiError> {
        self.send(self.request(Method::GET, "/cart", Some(token)))
            .await
    }
}
