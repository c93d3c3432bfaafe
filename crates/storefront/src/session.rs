//! Session provider.
//!
//! Exposes "current signed-in user, or none" as a value that can change at
//! any time. Stores read it when an operation needs an identity, and can
//! subscribe to be told about sign-in and sign-out.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use teeshop_core::UserId;

use crate::error::{clear_sentry_user, set_sentry_user};

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's ID in the hosted auth provider.
    pub id: UserId,
    /// User's email address, when known.
    pub email: Option<String>,
}

impl CurrentUser {
    /// A user known only by ID.
    #[must_use]
    pub const fn new(id: UserId) -> Self {
        Self { id, email: None }
    }
}

/// Shared handle to the current session.
///
/// Cheap to clone; every clone observes the same session.
#[derive(Clone)]
pub struct SessionProvider {
    tx: Arc<watch::Sender<Option<CurrentUser>>>,
}

impl SessionProvider {
    /// Create a provider, optionally already signed in.
    #[must_use]
    pub fn new(initial: Option<CurrentUser>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// A provider with nobody signed in.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::new(None)
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current(&self) -> Option<CurrentUser> {
        self.tx.borrow().clone()
    }

    /// Whether anyone is signed in.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Record a sign-in and notify subscribers.
    pub fn sign_in(&self, user: CurrentUser) {
        set_sentry_user(&user.id, user.email.as_deref());
        tracing::info!(user_id = %user.id, "Signed in");
        self.tx.send_replace(Some(user));
    }

    /// Record a sign-out and notify subscribers.
    pub fn sign_out(&self) {
        clear_sentry_user();
        if self.tx.send_replace(None).is_some() {
            tracing::info!("Signed out");
        }
    }

    /// Subscribe to session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentUser>> {
        self.tx.subscribe()
    }
}

impl Default for SessionProvider {
    fn default() -> Self {
        Self::signed_out()
    }
}

impl std::fmt::Debug for SessionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionProvider")
            .field("current", &*self.tx.borrow())
            .finish()
    }
}
