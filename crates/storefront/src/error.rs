//! Unified error handling with Sentry integration.
//!
//! Every store and service operation returns `Result<T, StoreError>`. Remote
//! failures are captured to Sentry when they are reported; the other kinds are
//! expected user-facing outcomes and only produce a message.

use std::time::Duration;

use thiserror::Error;

use teeshop_core::RatingError;

use crate::backend::RemoteError;

/// Outcome of a failed store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The operation needs a signed-in user and there is none.
    #[error("not signed in")]
    Unauthenticated,

    /// Checkout was requested with no lines in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// A checkout is already being submitted.
    #[error("checkout already in progress")]
    CheckoutInProgress,

    /// The review rating is missing or out of range.
    #[error("invalid rating: {0}")]
    InvalidRating(#[from] RatingError),

    /// The order, wishlist, review or profile store failed.
    #[error("remote store error: {0}")]
    Remote(#[from] RemoteError),

    /// A remote call did not finish within the configured timeout.
    #[error("remote store timed out")]
    Timeout,
}

impl StoreError {
    /// Whether the caller should present a sign-in flow.
    #[must_use]
    pub const fn requires_sign_in(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    /// Whether this is a backend failure (as opposed to a rejected request).
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_) | Self::Timeout)
    }

    /// Message suitable for showing to the shopper.
    ///
    /// Remote failures carry only the backend's own message, never transport
    /// internals.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Please sign in to continue".to_string(),
            Self::EmptyCart => "Your cart is empty".to_string(),
            Self::CheckoutInProgress => "Your order is already being placed".to_string(),
            Self::InvalidRating(err) => capitalize(&err.to_string()),
            Self::Remote(err) => match err.backend_message() {
                Some(message) => format!("Something went wrong: {message}"),
                None => "Something went wrong, please try again".to_string(),
            },
            Self::Timeout => "The store is taking too long to respond, please try again".to_string(),
        }
    }

    /// Log the error and capture backend failures to Sentry.
    ///
    /// Call this once where the outcome is surfaced to the shopper.
    pub fn report(&self, operation: &str) {
        if self.is_remote() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                operation,
                sentry_event_id = %event_id,
                "Store operation failed"
            );
        } else {
            tracing::info!(error = %self, operation, "Store operation rejected");
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Await a remote call, giving up after `limit`.
pub(crate) async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = std::result::Result<T, RemoteError>>,
) -> Result<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout)?
        .map_err(StoreError::from)
}

/// Set the Sentry user context from a user ID.
///
/// Call this after sign-in to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added line", Some(&[("product_id", "tshirt-001")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
