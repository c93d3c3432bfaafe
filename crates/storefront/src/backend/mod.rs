//! Remote data store clients.
//!
//! # Architecture
//!
//! - The hosted backend is the source of truth for orders, wishlists,
//!   reviews and profiles; stores never keep a local copy authoritative
//! - One object-safe trait per remote table group, so stores hold
//!   `Arc<dyn OrderStore>` and friends and tests can swap implementations
//! - [`RestBackend`] talks to the row-level query API over HTTP
//! - [`MemoryBackend`] keeps everything in process, for tests and local runs
//!
//! # Example
//!
//! ```rust,ignore
//! use teeshop_storefront::backend::{OrderStore, RestBackend};
//!
//! let backend = RestBackend::new(&config.backend, None)?;
//! let orders = backend.orders_for(user_id).await?;
//! ```

pub mod memory;
pub mod rest;

pub use memory::MemoryBackend;
pub use rest::RestBackend;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use teeshop_core::{
    NewOrder, NewOrderLine, NewReview, NewWishlistEntry, Order, OrderId, OrderLine, ProductId,
    Profile, Review, UserId, WishlistEntry,
};

/// Errors that can occur when talking to the remote data store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An expected row was missing from the response.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The transport gave up waiting.
    #[error("request timed out")]
    Timeout,

    /// The backend could not be reached or refused the call.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    /// The backend's own explanation, when it gave one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } | Self::Unavailable(message) => Some(message),
            _ => None,
        }
    }
}

/// Orders and order lines.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Create an order record and return it with its generated ID.
    async fn create_order(&self, order: &NewOrder) -> Result<Order, RemoteError>;

    /// Create all lines of an order in one request.
    async fn create_order_lines(&self, lines: &[NewOrderLine]) -> Result<(), RemoteError>;

    /// Delete an order record.
    async fn delete_order(&self, order_id: OrderId) -> Result<(), RemoteError>;

    /// All orders of a user, newest first.
    async fn orders_for(&self, user_id: UserId) -> Result<Vec<Order>, RemoteError>;

    /// All lines of an order.
    async fn lines_for(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RemoteError>;
}

/// Saved-product markers.
#[async_trait]
pub trait WishlistBackend: Send + Sync {
    /// Create an entry. Fails if `(user_id, product_id)` already exists.
    async fn insert_entry(&self, entry: &NewWishlistEntry) -> Result<(), RemoteError>;

    /// Delete the entry matching `(user_id, product_id)`. Deleting a missing
    /// entry succeeds.
    async fn delete_entry(&self, user_id: UserId, product_id: &ProductId)
    -> Result<(), RemoteError>;

    /// All entries owned by a user.
    async fn entries_for(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, RemoteError>;
}

/// Product reviews.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Create a review and return the stored row.
    async fn insert_review(&self, review: &NewReview) -> Result<Review, RemoteError>;

    /// All reviews of a product, newest first.
    async fn reviews_for(&self, product_id: &ProductId) -> Result<Vec<Review>, RemoteError>;
}

/// User profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// The profile of a user, if one exists.
    async fn profile(&self, user_id: UserId) -> Result<Option<Profile>, RemoteError>;

    /// Set the full name of a user.
    async fn update_full_name(
        &self,
        user_id: UserId,
        full_name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RemoteError>;
}

/// Every remote capability the storefront needs.
pub trait Backend: OrderStore + WishlistBackend + ReviewStore + ProfileStore {}

impl<T> Backend for T where T: OrderStore + WishlistBackend + ReviewStore + ProfileStore {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = RemoteError::Status {
            status: 400,
            message: "invalid input syntax for type uuid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "backend returned 400: invalid input syntax for type uuid"
        );
        assert_eq!(
            RemoteError::RateLimited(30).to_string(),
            "rate limited, retry after 30 seconds"
        );
    }

    #[test]
    fn test_backend_message() {
        assert_eq!(
            RemoteError::Unavailable("connection refused".to_string()).backend_message(),
            Some("connection refused")
        );
        assert_eq!(RemoteError::Timeout.backend_message(), None);
    }
}
