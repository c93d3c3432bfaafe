//! Composition root shared by every front end.

use std::sync::Arc;
use std::time::Duration;

use teeshop_core::Catalog;

use crate::backend::{
    Backend, OrderStore, ProfileStore, RemoteError, RestBackend, ReviewStore, WishlistBackend,
};
use crate::config::StorefrontConfig;
use crate::services::{OrderHistory, Profiles, Reviews};
use crate::session::SessionProvider;
use crate::storage::{FileStorage, LocalStorage};
use crate::stores::{CartStore, ScrollLock, WishlistStore};

/// Every store and service of one storefront session.
///
/// This struct is cheaply cloneable via `Arc`; clones share the same stores.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    catalog: Catalog,
    session: SessionProvider,
    scroll_lock: ScrollLock,
    cart: CartStore,
    wishlist: Arc<WishlistStore>,
    orders: OrderHistory,
    reviews: Reviews,
    profiles: Arc<Profiles>,
}

impl Storefront {
    /// Wire a storefront against the hosted backend, keeping device-local
    /// state under `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Http` if the HTTP client cannot be built.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, RemoteError> {
        let access_token = config.session.as_ref().map(|s| s.access_token.clone());
        let backend = Arc::new(RestBackend::new(&config.backend, access_token)?);
        let storage = Arc::new(FileStorage::new(config.data_dir.clone()));

        let session = SessionProvider::signed_out();
        if let Some(signed_in) = &config.session {
            session.sign_in(signed_in.current_user());
        }

        Ok(Self::with_backend(
            backend,
            storage,
            session,
            config.backend.request_timeout,
        ))
    }

    /// Wire a storefront from explicit handles.
    ///
    /// `timeout` bounds every remote call.
    pub fn with_backend<B: Backend + 'static>(
        backend: Arc<B>,
        storage: Arc<dyn LocalStorage>,
        session: SessionProvider,
        timeout: Duration,
    ) -> Self {
        let order_store: Arc<dyn OrderStore> = backend.clone();
        let wishlist_store: Arc<dyn WishlistBackend> = backend.clone();
        let review_store: Arc<dyn ReviewStore> = backend.clone();
        let profile_store: Arc<dyn ProfileStore> = backend;

        let scroll_lock = ScrollLock::new();
        let cart = CartStore::load(
            storage,
            Arc::clone(&order_store),
            session.clone(),
            scroll_lock.clone(),
            timeout,
        );
        let wishlist = Arc::new(WishlistStore::new(wishlist_store, session.clone(), timeout));
        let orders = OrderHistory::new(order_store, session.clone(), timeout);
        let profiles = Arc::new(Profiles::new(profile_store, session.clone(), timeout));
        let reviews = Reviews::new(review_store, Arc::clone(&profiles), session.clone(), timeout);

        Self {
            inner: Arc::new(StorefrontInner {
                catalog: Catalog::builtin(),
                session,
                scroll_lock,
                cart,
                wishlist,
                orders,
                reviews,
                profiles,
            }),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn session(&self) -> &SessionProvider {
        &self.inner.session
    }

    #[must_use]
    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.inner.scroll_lock
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn wishlist(&self) -> &Arc<WishlistStore> {
        &self.inner.wishlist
    }

    #[must_use]
    pub fn orders(&self) -> &OrderHistory {
        &self.inner.orders
    }

    #[must_use]
    pub fn reviews(&self) -> &Reviews {
        &self.inner.reviews
    }

    #[must_use]
    pub fn profiles(&self) -> &Profiles {
        &self.inner.profiles
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("session", &self.inner.session)
            .field("cart", &self.inner.cart)
            .field("wishlist", &self.inner.wishlist)
            .finish_non_exhaustive()
    }
}
