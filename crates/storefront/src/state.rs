//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::api::ApiClient;
use crate::config::StorefrontConfig;
use crate::middleware::{SessionSettings, derive_key};
use crate::view_cache::ViewCache;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds no per-visitor data: sessions live in
/// the visitor's cookie and carts in the commerce service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    api: ApiClient,
    cookie_key: Key,
    session: SessionSettings,
    views: ViewCache,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let api = ApiClient::new(&config.api);
        let cookie_key = derive_key(&config.session_secret);
        let session = SessionSettings {
            secure: config.is_secure(),
        };
        let views = ViewCache::new(config.view_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                api,
                cookie_key,
                session,
                views,
            }),
        }
    }

    /// Get a reference to the commerce service client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the rendered view cache.
    #[must_use]
    pub fn views(&self) -> &ViewCache {
        &self.inner.views
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.inner.cookie_key.clone()
    }
}

impl FromRef<AppState> for SessionSettings {
    fn from_ref(state: &AppState) -> Self {
        state.inner.session
    }
}
