//! Route guard: path-based access control run ahead of every page.
//!
//! The guard only looks at whether a session cookie is present. It never asks
//! the commerce service whether the token is still valid; shop pages do that
//! lazily through `actions::auth::current_user`, which clears stale cookies.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::session::CookieSession;

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";

/// Path of the home page.
pub const HOME_PATH: &str = "/";

/// How a route pattern matches a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPattern {
    /// Matches exactly this path.
    Exact(&'static str),
    /// Matches any path starting with this prefix.
    Prefix(&'static str),
}

impl PathPattern {
    fn matches(self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == p,
            Self::Prefix(p) => path.starts_with(p),
        }
    }
}

/// Session state a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only visitors without a session (the login page).
    GuestOnly,
    /// Only visitors with a session.
    Authenticated,
    /// Not guarded at all (assets, health checks, the API boundary).
    Bypass,
}

/// Routes with an explicit rule. Anything not listed requires a session.
pub const ROUTE_TABLE: &[(PathPattern, Access)] = &[
    (PathPattern::Exact(LOGIN_PATH), Access::GuestOnly),
    (PathPattern::Prefix("/static/"), Access::Bypass),
    (PathPattern::Exact("/api"), Access::Bypass),
    (PathPattern::Prefix("/api/"), Access::Bypass),
    (PathPattern::Exact("/health"), Access::Bypass),
    (PathPattern::Prefix("/health/"), Access::Bypass),
    (PathPattern::Exact("/favicon.ico"), Access::Bypass),
];

/// Outcome of running the guard for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the request through unchanged.
    Pass,
    /// Redirect to the given path instead.
    Redirect(&'static str),
}

/// Access rule for `path`.
#[must_use]
pub fn classify(path: &str) -> Access {
    ROUTE_TABLE
        .iter()
        .find(|(pattern, _)| pattern.matches(path))
        .map_or(Access::Authenticated, |(_, access)| *access)
}

/// Decide what to do with a request for `path`.
#[must_use]
pub fn decide(path: &str, has_session: bool) -> GuardDecision {
    match (classify(path), has_session) {
        (Access::GuestOnly, true) => GuardDecision::Redirect(HOME_PATH),
        (Access::Authenticated, false) => GuardDecision::Redirect(LOGIN_PATH),
        _ => GuardDecision::Pass,
    }
}

/// Middleware applying [`decide`] to every request.
pub async fn route_guard_middleware(
    session: CookieSession,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    match decide(path, session.is_present()) {
        GuardDecision::Pass => next.run(request).await,
        GuardDecision::Redirect(to) => {
            tracing::debug!(path = %path, to = %to, "Route guard redirect");
            Redirect::to(to).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("/login"), Access::GuestOnly);
        assert_eq!(classify("/"), Access::Authenticated);
        assert_eq!(classify("/cart"), Access::Authenticated);
        assert_eq!(classify("/product/42"), Access::Authenticated);
        assert_eq!(classify("/logout"), Access::Authenticated);
        assert_eq!(classify("/static/css/main.css"), Access::Bypass);
        assert_eq!(classify("/api"), Access::Bypass);
        assert_eq!(classify("/api/anything"), Access::Bypass);
        assert_eq!(classify("/health"), Access::Bypass);
        assert_eq!(classify("/health/ready"), Access::Bypass);
        assert_eq!(classify("/favicon.ico"), Access::Bypass);
    }

    #[test]
    fn test_login_lookalikes_are_protected() {
        assert_eq!(classify("/login/extra"), Access::Authenticated);
        assert_eq!(classify("/loginx"), Access::Authenticated);
        assert_eq!(classify("/healthz"), Access::Authenticated);
    }

    #[test]
    fn test_guest_is_sent_to_login() {
        assert_eq!(decide("/cart", false), GuardDecision::Redirect("/login"));
        assert_eq!(decide("/", false), GuardDecision::Redirect("/login"));
        assert_eq!(decide("/login", false), GuardDecision::Pass);
    }

    #[test]
    fn test_signed_in_visitor_is_sent_home_from_login() {
        assert_eq!(decide("/login", true), GuardDecision::Redirect("/"));
        assert_eq!(decide("/cart", true), GuardDecision::Pass);
        assert_eq!(decide("/product/7", true), GuardDecision::Pass);
    }

    #[test]
    fn test_bypass_ignores_session() {
        for has_session in [true, false] {
            assert_eq!(decide("/static/app.css", has_session), GuardDecision::Pass);
            assert_eq!(decide("/health", has_session), GuardDecision::Pass);
        }
    }
}
