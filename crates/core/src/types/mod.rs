//! Core types for Redis Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod catalog;
pub mod email;
pub mod id;
pub mod price;

pub use cart::CartEntry;
pub use catalog::{HomepageContent, Product, Sourced};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
