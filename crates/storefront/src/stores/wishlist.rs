//! Wishlist store.
//!
//! The remote store is the source of truth for wishlist entries; this store
//! only keeps a cache of the signed-in user's entries. Every mutation is
//! followed by a full re-fetch instead of an optimistic local update, so the
//! cache never shows a state the remote store does not have.
//!
//! The cache is discarded on sign-out and re-fetched on sign-in when the
//! store follows the session (see [`WishlistStore::follow_session`]).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::instrument;

use teeshop_core::{Catalog, NewWishlistEntry, Product, ProductId, WishlistEntry};

use crate::backend::WishlistBackend;
use crate::error::{StoreError, add_breadcrumb, bounded};
use crate::session::SessionProvider;

/// Marks the store as loading while alive.
struct Loading<'a>(&'a AtomicUsize);

impl<'a> Loading<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Saved products of the signed-in user.
pub struct WishlistStore {
    entries: RwLock<Vec<WishlistEntry>>,
    loading: AtomicUsize,
    backend: Arc<dyn WishlistBackend>,
    session: SessionProvider,
    timeout: Duration,
}

impl WishlistStore {
    /// Create an empty store. Call [`refresh`](Self::refresh) to load it.
    #[must_use]
    pub fn new(
        backend: Arc<dyn WishlistBackend>,
        session: SessionProvider,
        timeout: Duration,
    ) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            loading: AtomicUsize::new(0),
            backend,
            session,
            timeout,
        }
    }

    fn replace(&self, entries: Vec<WishlistEntry>) {
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = entries;
    }

    /// Cached entries.
    #[must_use]
    pub fn entries(&self) -> Vec<WishlistEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `product_id` is in the cached entries.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| &e.product_id == product_id)
    }

    /// Catalog products for the cached entries. Entries whose product is no
    /// longer in the catalog are skipped.
    #[must_use]
    pub fn products(&self, catalog: &Catalog) -> Vec<Product> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|e| catalog.get(&e.product_id).cloned())
            .collect()
    }

    /// Whether a refresh is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire) > 0
    }

    /// Drop the cache without touching the remote store.
    pub fn discard(&self) {
        self.replace(Vec::new());
    }

    /// Replace the cache with the signed-in user's entries.
    ///
    /// Signed out, the cache is emptied and nothing is fetched. If the user
    /// changes while the fetch is in flight, the result is dropped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Remote` or `StoreError::Timeout` if the fetch
    /// fails; the cache is left unchanged.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let Some(user) = self.session.current() else {
            self.discard();
            return Ok(());
        };

        let _loading = Loading::start(&self.loading);
        let entries = bounded(self.timeout, self.backend.entries_for(user.id)).await?;

        if self.session.current().map(|u| u.id) == Some(user.id) {
            tracing::debug!(entries = entries.len(), "Wishlist refreshed");
            self.replace(entries);
        } else {
            tracing::debug!("Session changed during wishlist refresh; dropping result");
        }
        Ok(())
    }

    /// Save `product_id` for the signed-in user, then refresh.
    ///
    /// # Errors
    ///
    /// - `StoreError::Unauthenticated` if nobody is signed in
    /// - `StoreError::Remote` or `StoreError::Timeout` if the remote store
    ///   fails; the cache is left unchanged
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: &ProductId) -> Result<(), StoreError> {
        let user = self.session.current().ok_or(StoreError::Unauthenticated)?;

        let entry = NewWishlistEntry {
            user_id: user.id,
            product_id: product_id.clone(),
        };
        bounded(self.timeout, self.backend.insert_entry(&entry)).await?;
        add_breadcrumb(
            "wishlist",
            "Saved product",
            Some(&[("product_id", product_id.as_str())]),
        );

        self.refresh().await
    }

    /// Remove `product_id` for the signed-in user, then refresh.
    ///
    /// # Errors
    ///
    /// - `StoreError::Unauthenticated` if nobody is signed in
    /// - `StoreError::Remote` or `StoreError::Timeout` if the remote store
    ///   fails; the cache is left unchanged
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: &ProductId) -> Result<(), StoreError> {
        let user = self.session.current().ok_or(StoreError::Unauthenticated)?;

        bounded(
            self.timeout,
            self.backend.delete_entry(user.id, product_id),
        )
        .await?;
        add_breadcrumb(
            "wishlist",
            "Removed product",
            Some(&[("product_id", product_id.as_str())]),
        );

        self.refresh().await
    }

    /// Keep the cache in step with the session.
    ///
    /// Sign-out discards the cache; sign-in re-fetches it. The task runs
    /// until the returned handle is aborted.
    pub fn follow_session(self: Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.session.subscribe();
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let signed_in = changes.borrow_and_update().is_some();
                if signed_in {
                    if let Err(e) = self.refresh().await {
                        e.report("wishlist.refresh");
                    }
                } else {
                    self.discard();
                }
            }
        })
    }
}

impl std::fmt::Debug for WishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore")
            .field("entries", &self.len())
            .field("loading", &self.is_loading())
            .finish_non_exhaustive()
    }
}
