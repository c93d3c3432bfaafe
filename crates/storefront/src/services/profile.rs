//! User profiles.
//!
//! Profiles are cached for five minutes using `moka`, since review listings
//! look up the same authors over and over.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use tracing::{debug, instrument};

use teeshop_core::{Profile, UserId};

use crate::backend::ProfileStore;
use crate::error::{StoreError, bounded};
use crate::session::SessionProvider;

/// Name shown for authors without a profile name.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous User";

/// Profile lookups and edits.
pub struct Profiles {
    store: Arc<dyn ProfileStore>,
    session: SessionProvider,
    timeout: Duration,
    cache: Cache<UserId, Option<Profile>>,
}

impl Profiles {
    #[must_use]
    pub fn new(store: Arc<dyn ProfileStore>, session: SessionProvider, timeout: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            store,
            session,
            timeout,
            cache,
        }
    }

    /// The profile of `user_id`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Remote` or `StoreError::Timeout` if the lookup
    /// fails.
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        if let Some(profile) = self.cache.get(&user_id).await {
            debug!("Cache hit for profile");
            return Ok(profile);
        }

        let profile = bounded(self.timeout, self.store.profile(user_id)).await?;
        self.cache.insert(user_id, profile.clone()).await;
        Ok(profile)
    }

    /// The signed-in user's profile.
    ///
    /// # Errors
    ///
    /// - `StoreError::Unauthenticated` if nobody is signed in
    /// - `StoreError::Remote` or `StoreError::Timeout` if the lookup fails
    pub async fn current(&self) -> Result<Option<Profile>, StoreError> {
        let user = self.session.current().ok_or(StoreError::Unauthenticated)?;
        self.profile(user.id).await
    }

    /// Set the signed-in user's full name.
    ///
    /// # Errors
    ///
    /// - `StoreError::Unauthenticated` if nobody is signed in
    /// - `StoreError::Remote` or `StoreError::Timeout` if the update fails
    #[instrument(skip(self, full_name))]
    pub async fn update_full_name(&self, full_name: &str) -> Result<(), StoreError> {
        let user = self.session.current().ok_or(StoreError::Unauthenticated)?;

        bounded(
            self.timeout,
            self.store
                .update_full_name(user.id, full_name.trim(), Utc::now()),
        )
        .await?;
        self.cache.invalidate(&user.id).await;
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(())
    }

    /// Name to show next to content written by `user_id`.
    ///
    /// Falls back to [`ANONYMOUS_AUTHOR`] when the user has no name or the
    /// lookup fails.
    pub async fn display_name(&self, user_id: UserId) -> String {
        match self.profile(user_id).await {
            Ok(profile) => profile
                .as_ref()
                .and_then(Profile::display_name)
                .unwrap_or(ANONYMOUS_AUTHOR)
                .to_string(),
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Failed to load author profile");
                ANONYMOUS_AUTHOR.to_string()
            }
        }
    }
}
