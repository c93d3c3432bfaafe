//! Wishlist entry records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, UserId, WishlistEntryId};

/// Insert payload for the `wishlists` table.
///
/// The remote store enforces uniqueness of `(user_id, product_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWishlistEntry {
    pub user_id: UserId,
    pub product_id: ProductId,
}

/// A saved-product marker owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: WishlistEntryId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}
