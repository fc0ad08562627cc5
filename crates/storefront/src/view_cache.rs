//! Rendered page cache for per-viewer views.
//!
//! Disabled unless `STOREFRONT_VIEW_CACHE_TTL_SECS` is set: by default every
//! page read goes to the commerce service. When enabled, rendered cart pages
//! are kept per (path, viewer) for the TTL, and any cart mutation drops the
//! viewer's entry so the next read recomputes it.

use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// Path of the cart page, the only cached view.
pub const CART_VIEW_PATH: &str = "/cart";

/// Upper bound on cached pages.
const MAX_ENTRIES: u64 = 10_000;

/// Cache key: page path plus the viewer's session token.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct ViewKey {
    path: &'static str,
    viewer: String,
}

impl ViewKey {
    fn new(path: &'static str, token: &SecretString) -> Self {
        Self {
            path,
            viewer: token.expose_secret().to_string(),
        }
    }
}

/// Cache of rendered HTML keyed by page and viewer.
#[derive(Clone, Default)]
pub struct ViewCache {
    pages: Option<Cache<ViewKey, String>>,
}

impl ViewCache {
    /// Create a cache holding pages for `ttl`, or a no-op cache for `None`.
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        let pages = ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build()
        });
        Self { pages }
    }

    /// Cached rendering of `path` for the viewer holding `token`.
    pub async fn get(&self, path: &'static str, token: &SecretString) -> Option<String> {
        let pages = self.pages.as_ref()?;
        let hit = pages.get(&ViewKey::new(path, token)).await;
        if hit.is_some() {
            debug!(path, "View cache hit");
        }
        hit
    }

    /// Store a rendering of `path` for the viewer holding `token`.
    pub async fn insert(&self, path: &'static str, token: &SecretString, html: String) {
        if let Some(pages) = &self.pages {
            pages.insert(ViewKey::new(path, token), html).await;
        }
    }

    /// Drop the viewer's rendering of `path` so the next read recomputes it.
    pub async fn invalidate(&self, path: &'static str, token: &SecretString) {
        if let Some(pages) = &self.pages {
            pages.invalidate(&ViewKey::new(path, token)).await;
            debug!(path, "View cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(s: &str) -> SecretString {
        SecretString::from(s)
    }

    #[tokio::test]
    async fn test_disabled_cache_stores_nothing() {
        let cache = ViewCache::new(None);

        cache.insert(CART_VIEW_PATH, &token("a"), "<p>cart</p>".into()).await;
        assert_eq!(cache.get(CART_VIEW_PATH, &token("a")).await, None);
    }

    #[tokio::test]
    async fn test_entries_are_per_viewer() {
        let cache = ViewCache::new(Some(Duration::from_secs(60)));
        cache.insert(CART_VIEW_PATH, &token("a"), "<p>a</p>".into()).await;

        assert_eq!(
            cache.get(CART_VIEW_PATH, &token("a")).await.as_deref(),
            Some("<p>a</p>")
        );
        assert_eq!(cache.get(CART_VIEW_PATH, &token("b")).await, None);
    }

    #[tokio::test]
    async fn test_invalidate_drops_only_that_viewer() {
        let cache = ViewCache::new(Some(Duration::from_secs(60)));
        cache.insert(CART_VIEW_PATH, &token("a"), "<p>a</p>".into()).await;
        cache.insert(CART_VIEW_PATH, &token("b"), "<p>b</p>".into()).await;

        cache.invalidate(CART_VIEW_PATH, &token("a")).await;

        assert_eq!(cache.get(CART_VIEW_PATH, &token("a")).await, None);
        assert!(cache.get(CART_VIEW_PATH, &token("b")).await.is_some());
    }
}
