//! Redis Shop storefront library.
//!
//! Server-rendered pages backed entirely by the remote commerce service. The
//! binary in `main.rs` wires configuration, logging and Sentry around
//! [`routes::app`]; integration tests drive the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod actions;
pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod view_cache;
