//! Process-wide state containers.
//!
//! Each store is constructed once per session by the composition root
//! ([`crate::state::Storefront`]) and shared by reference.

pub mod cart;
pub mod wishlist;

pub use cart::{CartLine, CartProduct, CartState, CartStore, CheckoutReceipt, ScrollLock};
pub use wishlist::WishlistStore;
