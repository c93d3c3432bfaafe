//! Teeshop Core - Shared types library.
//!
//! This crate provides common types used across all Teeshop components:
//! - `storefront` - Cart, wishlist, orders, reviews and the remote backend
//! - `cli` - Terminal front end for browsing and checkout
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! network clients, no storage. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, statuses and ratings
//! - [`product`] - Product reference data
//! - [`catalog`] - The static product catalog and its filtered views
//! - [`models`] - Records exchanged with the remote data store

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod models;
pub mod product;
pub mod types;

pub use catalog::{Catalog, PriceRange, ProductFilter, SortOrder};
pub use models::*;
pub use product::{Product, ProductFlags, Sale};
pub use types::*;
