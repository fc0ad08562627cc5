//! Remote commerce service client.
//!
//! # Architecture
//!
//! - Every page read is a fresh round trip: no response caching here, and every
//!   request asks intermediaries not to serve stale copies either
//! - Non-2xx responses collapse into a single [`ApiError::Remote`] carrying a
//!   human-readable message
//! - Action handlers depend on the [`CommerceApi`] trait, not on the concrete
//!   [`ApiClient`], so they can be exercised against an in-memory fake
//!
//! # Endpoints
//!
//! ```text
//! POST /login                 {email,password} -> {token}
//! GET  /me            bearer  -> {user_id}
//! GET  /product/{id}          -> {source, data: {id,name,price,stock}}
//! GET  /homepage              -> {source, data: {banners[], featured[]}}
//! POST /cart/add?pid&qty bearer -> {message, cart[]}
//! GET  /cart          bearer  -> {cart: [{pid,qty}]}
//! ```

mod client;
pub mod types;

use std::future::Future;

use redis_shop_core::{HomepageContent, Product, ProductId, Sourced};
use reqwest::StatusCode;
use secrecy::SecretString;
use thiserror::Error;

pub use client::ApiClient;
pub use types::{CartAddResponse, CartResponse, LoginResponse, MeResponse};

/// Errors that can occur when talking to the commerce service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status.
    #[error("{message}")]
    Remote {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Message taken from the error body, or a fallback.
        message: String,
    },

    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Message safe to show to a shopper.
    ///
    /// Remote errors carry the service's own message. Transport and decode
    /// failures are internal, so the caller's `fallback` is shown instead.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Remote { message, .. } => message.clone(),
            Self::Transport(_) | Self::Decode(_) => fallback.to_string(),
        }
    }

    /// HTTP status of a remote error.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

/// Operations the storefront needs from the commerce service.
pub trait CommerceApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// Resolve the user behind a bearer token.
    fn get_me(&self, token: &SecretString)
    -> impl Future<Output = Result<MeResponse, ApiError>> + Send;

    /// Look up a product by id.
    fn get_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Sourced<Product>, ApiError>> + Send;

    /// Fetch homepage banners and featured product ids.
    fn get_homepage(
        &self,
    ) -> impl Future<Output = Result<Sourced<HomepageContent>, ApiError>> + Send;

    /// Append `quantity` units of a product to the token owner's cart.
    fn add_to_cart(
        &self,
        token: &SecretString,
        product_id: ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<CartAddResponse, ApiError>> + Send;

    /// Read the token owner's cart.
    fn get_cart(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<CartResponse, ApiError>> + Send;
}
