//! Session cookie storage.
//!
//! The whole session is one encrypted, http-only cookie holding the bearer
//! token issued by the commerce service. There is no server-side session
//! state: reading the cookie is reading the session.

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use secrecy::{ExposeSecret, SecretString};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "redis_shop_session";

/// Session lifetime in seconds (1 hour), independent of activity.
const SESSION_MAX_AGE_SECONDS: i64 = 60 * 60;

/// Read/write access to the current visitor's session token.
///
/// Action handlers take this as an explicit argument instead of reaching for
/// request-global state.
pub trait SessionAccess {
    /// The stored bearer token, if any. A missing cookie is not an error.
    fn get(&self) -> Option<SecretString>;

    /// Store `token` as the visitor's session.
    fn set(&mut self, token: SecretString);

    /// Forget the visitor's session.
    fn clear(&mut self);
}

/// Cookie attributes that depend on deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionSettings {
    /// Mark the cookie `Secure` (served over HTTPS).
    pub secure: bool,
}

/// Cookie-backed session.
///
/// Extract it in a handler, mutate it through [`SessionAccess`], and return
/// it as part of the response so changes are sent as `Set-Cookie` headers.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(mut session: CookieSession) -> impl IntoResponse {
///     session.clear();
///     (session, Redirect::to("/login"))
/// }
/// ```
#[derive(Clone)]
pub struct CookieSession {
    jar: PrivateCookieJar,
    settings: SessionSettings,
}

impl CookieSession {
    /// Wrap an existing cookie jar.
    #[must_use]
    pub const fn new(jar: PrivateCookieJar, settings: SessionSettings) -> Self {
        Self { jar, settings }
    }

    /// Whether the request carried a readable session cookie.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }

    fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, token))
            .http_only(true)
            .secure(self.settings.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(SESSION_MAX_AGE_SECONDS))
            .path("/")
            .build()
    }
}

impl SessionAccess for CookieSession {
    fn get(&self) -> Option<SecretString> {
        // Cookies that fail to decrypt are dropped by the jar and read as absent.
        self.jar
            .get(SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
            .map(SecretString::from)
    }

    fn set(&mut self, token: SecretString) {
        let cookie = self.session_cookie(token.expose_secret().to_string());
        self.jar = self.jar.clone().add(cookie);
    }

    fn clear(&mut self) {
        self.jar = self
            .jar
            .clone()
            .remove(Cookie::build((SESSION_COOKIE_NAME, "")).path("/"));
    }
}

impl<S> FromRequestParts<S> for CookieSession
where
    S: Send + Sync,
    Key: FromRef<S>,
    SessionSettings: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, Key::from_ref(state));
        Ok(Self::new(jar, SessionSettings::from_ref(state)))
    }
}

impl IntoResponseParts for CookieSession {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}

/// Derive the cookie encryption key from the configured session secret.
///
/// Configuration loading rejects secrets shorter than 32 bytes.
///
/// # Panics
///
/// Panics if `secret` is shorter than 32 bytes.
#[must_use]
pub fn derive_key(secret: &SecretString) -> Key {
    Key::derive_from(secret.expose_secret().as_bytes())
}
