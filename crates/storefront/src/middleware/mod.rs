//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, one hub per request)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame deny, no-store)
//! 5. Route guard (session presence vs. path access rule)
//!
//! Rate limiting is applied per route (login submissions only).

pub mod guard;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use guard::{Access, GuardDecision, decide, route_guard_middleware};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{CookieSession, SESSION_COOKIE_NAME, SessionAccess, SessionSettings, derive_key};
