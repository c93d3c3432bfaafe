//! Teeshop Storefront library.
//!
//! The stateful half of the storefront: the cart and wishlist stores, order
//! history, reviews and profiles, wired over a remote backend and
//! device-local storage. Front ends build a [`Storefront`] once per session
//! and drive it.
//!
//! # Modules
//!
//! - [`stores`] - Cart and wishlist state containers
//! - [`services`] - Order history, reviews and profiles
//! - [`backend`] - Remote store traits with HTTP and in-memory implementations
//! - [`storage`] - Device-local key-value storage
//! - [`session`] - Current signed-in user
//! - [`state`] - Composition root

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;
pub mod stores;

pub use error::{Result, StoreError};
pub use state::Storefront;
