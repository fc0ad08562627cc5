//! Redis Shop Core - Shared types library.
//!
//! This crate provides the domain types exchanged between the storefront and
//! the remote commerce service:
//! - Catalog data (products, homepage content)
//! - Cart entries
//! - Validated newtypes for emails, IDs and prices
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Everything
//! here is transient: values are decoded from the commerce service on every
//! read and never mutated in place.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and wire types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
