//! Action handlers: the server-side operations behind pages and forms.
//!
//! Each action takes its collaborators explicitly (a [`CommerceApi`], a
//! [`SessionAccess`], the [`ViewCache`](crate::view_cache::ViewCache) when it
//! invalidates views) and reports expected failures as an [`ActionError`]
//! message rather than an HTTP error. Route handlers decide how to render it.
//!
//! [`CommerceApi`]: crate::api::CommerceApi
//! [`SessionAccess`]: crate::middleware::SessionAccess

pub mod auth;
pub mod cart;
pub mod catalog;

#[cfg(test)]
pub(crate) mod testing;

use axum::response::{IntoResponse, Redirect, Response};
use thiserror::Error;

use crate::api::ApiError;

pub use auth::{CurrentUser, current_user, login, logout};
pub use cart::{CartAdded, CartLine, CartSummary, add_to_cart, cart_lines, get_cart};
pub use catalog::{featured_products, get_homepage, get_product};

/// Expected failure of an action, carrying a message fit for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    /// Create an error with a display message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The display message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Convert a client error, using `fallback` when it has no remote message.
    pub(crate) fn from_api(err: &ApiError, fallback: &str) -> Self {
        if !matches!(err, ApiError::Remote { .. }) {
            tracing::warn!(error = %err, "{fallback}");
        }
        Self::new(err.user_message(fallback))
    }
}

/// Result of an action: the value, or a message to show in its place.
pub type ApiResult<T> = Result<T, ActionError>;

/// Where an action sends the visitor next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The home page.
    Home,
    /// The login page.
    Login,
}

impl Navigation {
    /// Path of the destination page.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => crate::middleware::guard::HOME_PATH,
            Self::Login => crate::middleware::guard::LOGIN_PATH,
        }
    }
}

impl IntoResponse for Navigation {
    fn into_response(self) -> Response {
        Redirect::to(self.path()).into_response()
    }
}
