//! Cart store.
//!
//! Owns the shopping cart: its lines, the derived totals, the open/closed
//! panel flag and checkout. The lines are device-scoped: they are written to
//! local storage after every mutation and read back once at startup, and
//! they survive sign-out.
//!
//! # Checkout
//!
//! Checkout needs a signed-in user and a non-empty cart. It submits one
//! order record, then all order lines in a single request. On success the
//! cart is cleared and the panel closed. If submitting the lines fails, the
//! just-created order record is deleted again (best effort) and the cart is
//! left as it was. Only one checkout may be in flight; a second call while
//! one is running fails with [`StoreError::CheckoutInProgress`].

mod line;
mod scroll_lock;
mod state;

pub use line::{CartLine, CartProduct, LineKey};
pub use scroll_lock::{ScrollLock, ScrollLockGuard};
pub use state::CartState;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::instrument;

use teeshop_core::{NewOrder, NewOrderLine, OrderId, OrderStatus, Price, Product, ProductId};

use crate::backend::OrderStore;
use crate::error::{StoreError, add_breadcrumb, bounded};
use crate::session::SessionProvider;
use crate::storage::{LocalStorage, StorageError};

/// Local storage key holding the serialized lines.
pub const CART_STORAGE_KEY: &str = "cart";

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub total: Price,
    pub item_count: u32,
}

/// Clears the checking-out flag when dropped.
struct CheckoutGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> CheckoutGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for CheckoutGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// The shopping cart.
pub struct CartStore {
    state: Mutex<CartState>,
    panel: Mutex<Option<ScrollLockGuard>>,
    checking_out: AtomicBool,
    storage: Arc<dyn LocalStorage>,
    orders: Arc<dyn OrderStore>,
    session: SessionProvider,
    scroll_lock: ScrollLock,
    timeout: Duration,
}

impl CartStore {
    /// Create the store, restoring any lines saved on this device.
    ///
    /// A stored value that cannot be read as a cart is discarded and the cart
    /// starts empty.
    pub fn load(
        storage: Arc<dyn LocalStorage>,
        orders: Arc<dyn OrderStore>,
        session: SessionProvider,
        scroll_lock: ScrollLock,
        timeout: Duration,
    ) -> Self {
        let state = restore(storage.as_ref());
        tracing::debug!(lines = state.lines().len(), "Cart restored");

        Self {
            state: Mutex::new(state),
            panel: Mutex::new(None),
            checking_out: AtomicBool::new(false),
            storage,
            orders,
            session,
            scroll_lock,
            timeout,
        }
    }

    fn state(&self) -> MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn panel(&self) -> MutexGuard<'_, Option<ScrollLockGuard>> {
        self.panel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` to the state and persist the result.
    fn mutate<R>(&self, change: impl FnOnce(&mut CartState) -> R) -> R {
        let mut state = self.state();
        let result = change(&mut state);
        if let Err(e) = persist(self.storage.as_ref(), &state) {
            tracing::warn!(error = %e, "Failed to save cart");
        }
        result
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// A copy of the current lines and totals.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.state().clone()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.state().lines().to_vec()
    }

    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.state().total_items()
    }

    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.state().total_price()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().is_empty()
    }

    #[must_use]
    pub fn is_checking_out(&self) -> bool {
        self.checking_out.load(Ordering::Acquire)
    }

    // -------------------------------------------------------------------------
    // Line mutations
    // -------------------------------------------------------------------------

    /// Add `quantity` units of `product` in `size` and `color`.
    ///
    /// Adds to the existing line when one has the same product, size and
    /// color. A zero quantity is ignored.
    pub fn add_line(&self, product: &Product, quantity: u32, size: &str, color: &str) {
        if quantity == 0 {
            tracing::warn!(product_id = %product.id, "Ignoring add of zero units");
            return;
        }

        self.mutate(|state| {
            state.add(CartLine {
                product: CartProduct::from(product),
                quantity,
                size: size.to_string(),
                color: color.to_string(),
            });
        });
        add_breadcrumb(
            "cart",
            "Added line",
            Some(&[("product_id", product.id.as_str()), ("size", size), ("color", color)]),
        );
    }

    /// Remove the matching line. Missing lines are ignored.
    pub fn remove_line(&self, product_id: &ProductId, size: &str, color: &str) {
        let removed = self.mutate(|state| state.remove(LineKey::new(product_id, size, color)));
        if removed {
            add_breadcrumb(
                "cart",
                "Removed line",
                Some(&[("product_id", product_id.as_str())]),
            );
        }
    }

    /// Overwrite the quantity of the matching line.
    ///
    /// Zero or a negative quantity removes the line. Missing lines are
    /// ignored.
    pub fn set_quantity(&self, product_id: &ProductId, size: &str, color: &str, quantity: i64) {
        let quantity = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);
        self.mutate(|state| state.set_quantity(LineKey::new(product_id, size, color), quantity));
    }

    /// Remove every line.
    pub fn clear(&self) {
        self.mutate(CartState::clear);
        add_breadcrumb("cart", "Cleared cart", None);
    }

    // -------------------------------------------------------------------------
    // Panel
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.panel().is_some()
    }

    /// Show the cart panel, suspending background scroll.
    pub fn open(&self) {
        let mut panel = self.panel();
        if panel.is_none() {
            *panel = Some(self.scroll_lock.acquire());
        }
    }

    /// Hide the cart panel, resuming background scroll.
    pub fn close(&self) {
        let released = self.panel().take();
        drop(released);
    }

    /// Flip the panel and return whether it is now open.
    pub fn toggle_open(&self) -> bool {
        let mut panel = self.panel();
        if panel.take().is_some() {
            false
        } else {
            *panel = Some(self.scroll_lock.acquire());
            true
        }
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Turn the cart into an order.
    ///
    /// # Errors
    ///
    /// - `StoreError::Unauthenticated` if nobody is signed in
    /// - `StoreError::EmptyCart` if the cart has no lines
    /// - `StoreError::CheckoutInProgress` if another checkout is running
    /// - `StoreError::Remote` or `StoreError::Timeout` if either submission
    ///   fails; the cart is left unchanged
    #[instrument(skip(self), fields(user_id = tracing::field::Empty, order_id = tracing::field::Empty))]
    pub async fn checkout(&self) -> Result<CheckoutReceipt, StoreError> {
        let user = self.session.current().ok_or(StoreError::Unauthenticated)?;
        tracing::Span::current().record("user_id", tracing::field::display(user.id));

        let cart = self.snapshot();
        if cart.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        let _in_flight =
            CheckoutGuard::acquire(&self.checking_out).ok_or(StoreError::CheckoutInProgress)?;
        add_breadcrumb("checkout", "Submitting order", None);

        let new_order = NewOrder {
            user_id: user.id,
            total: cart.total_price(),
            status: OrderStatus::Pending,
        };
        let order = bounded(self.timeout, self.orders.create_order(&new_order)).await?;
        tracing::Span::current().record("order_id", tracing::field::display(order.id));

        let lines: Vec<NewOrderLine> = cart
            .lines()
            .iter()
            .map(|line| NewOrderLine {
                order_id: order.id,
                product_id: line.product.id.clone(),
                quantity: line.quantity,
                size: line.size.clone(),
                color: line.color.clone(),
                price: line.product.unit_price,
            })
            .collect();

        if let Err(e) = bounded(self.timeout, self.orders.create_order_lines(&lines)).await {
            self.discard_order(order.id).await;
            return Err(e);
        }

        self.mutate(CartState::clear);
        self.close();
        tracing::info!(lines = lines.len(), total = %cart.total(), "Order placed");

        Ok(CheckoutReceipt {
            order_id: order.id,
            total: cart.total(),
            item_count: cart.total_items(),
        })
    }

    /// Delete an order whose lines could not be stored.
    async fn discard_order(&self, order_id: OrderId) {
        match bounded(self.timeout, self.orders.delete_order(order_id)).await {
            Ok(()) => tracing::info!(%order_id, "Removed order without lines"),
            Err(e) => tracing::warn!(
                %order_id,
                error = %e,
                "Failed to remove order without lines"
            ),
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &*self.state())
            .field("open", &self.is_open())
            .field("checking_out", &self.is_checking_out())
            .finish_non_exhaustive()
    }
}

fn restore(storage: &dyn LocalStorage) -> CartState {
    let raw = match storage.get(CART_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return CartState::default(),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable saved cart");
            discard_saved(storage);
            return CartState::default();
        }
    };

    match serde_json::from_str::<Vec<CartLine>>(&raw) {
        Ok(lines) => CartState::from_lines(lines),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding malformed saved cart");
            discard_saved(storage);
            CartState::default()
        }
    }
}

fn discard_saved(storage: &dyn LocalStorage) {
    if let Err(e) = storage.remove(CART_STORAGE_KEY) {
        tracing::warn!(error = %e, "Failed to remove saved cart");
    }
}

fn persist(storage: &dyn LocalStorage, state: &CartState) -> Result<(), StorageError> {
    let raw = serde_json::to_string(state.lines())?;
    storage.set(CART_STORAGE_KEY, &raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use teeshop_core::{Catalog, ProductFlags, UserId};

    use super::*;
    use crate::backend::{MemoryBackend, RemoteError};
    use crate::session::CurrentUser;
    use crate::storage::{FileStorage, MemoryStorage};

    const TIMEOUT: Duration = Duration::from_secs(1);

    struct Fixture {
        backend: Arc<MemoryBackend>,
        storage: Arc<MemoryStorage>,
        session: SessionProvider,
        scroll_lock: ScrollLock,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                backend: Arc::new(MemoryBackend::new()),
                storage: Arc::new(MemoryStorage::new()),
                session: SessionProvider::signed_out(),
                scroll_lock: ScrollLock::new(),
            }
        }

        fn signed_in() -> Self {
            let fixture = Self::new();
            fixture
                .session
                .sign_in(CurrentUser::new(UserId::generate()));
            fixture
        }

        fn cart(&self) -> CartStore {
            self.cart_with_timeout(TIMEOUT)
        }

        fn cart_with_timeout(&self, timeout: Duration) -> CartStore {
            CartStore::load(
                self.storage.clone(),
                self.backend.clone(),
                self.session.clone(),
                self.scroll_lock.clone(),
                timeout,
            )
        }
    }

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Tee {id}"),
            description: String::new(),
            price: Decimal::new(cents, 2),
            colors: vec!["black".to_string()],
            sizes: vec!["M".to_string(), "L".to_string()],
            images: Vec::new(),
            category: "Basic".to_string(),
            flags: ProductFlags::default(),
            sale: None,
        }
    }

    #[test]
    fn test_add_line_merges_same_key() {
        let fixture = Fixture::new();
        let cart = fixture.cart();
        let p = product("p", 1000);

        cart.add_line(&p, 2, "M", "black");
        cart.add_line(&p, 3, "M", "black");

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn test_totals() {
        let fixture = Fixture::new();
        let cart = fixture.cart();
        cart.add_line(&product("a", 1000), 2, "M", "black");
        cart.add_line(&product("b", 500), 1, "M", "black");

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Decimal::new(2500, 2));
        assert_eq!(cart.snapshot().total().to_string(), "$25.00");
    }

    #[test]
    fn test_zero_quantity_add_is_ignored() {
        let fixture = Fixture::new();
        let cart = fixture.cart();
        cart.add_line(&product("a", 1000), 0, "M", "black");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        let fixture = Fixture::new();
        let cart = fixture.cart();
        let a = product("a", 1000);
        let b = product("b", 500);
        cart.add_line(&a, 2, "M", "black");
        cart.add_line(&b, 2, "M", "black");

        cart.set_quantity(&a.id, "M", "black", 0);
        cart.set_quantity(&b.id, "M", "black", -3);
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let fixture = Fixture::new();
        let cart = fixture.cart();
        let a = product("a", 1000);
        cart.add_line(&a, 2, "M", "black");

        cart.set_quantity(&a.id, "M", "black", 7);
        cart.set_quantity(&a.id, "L", "black", 9);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_items(), 7);
    }

    #[test]
    fn test_remove_missing_line_is_a_no_op() {
        let fixture = Fixture::new();
        let cart = fixture.cart();
        cart.add_line(&product("a", 1000), 1, "M", "black");
        cart.remove_line(&ProductId::from("zzz"), "M", "black");
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_lines_survive_restart() {
        let fixture = Fixture::new();
        let cart = fixture.cart();
        let catalog = Catalog::builtin();
        let tee = catalog.get(&ProductId::from("tshirt-002")).unwrap();
        cart.add_line(tee, 2, "L", "White");
        cart.add_line(&product("b", 500), 1, "M", "black");
        let before = cart.lines();
        drop(cart);

        let reloaded = fixture.cart();
        assert_eq!(reloaded.lines(), before);
        assert_eq!(reloaded.total_items(), 3);
    }

    #[test]
    fn test_malformed_saved_cart_starts_empty() {
        let negative_quantity = r#"[{"product":{"id":"p","name":"Tee p","unit_price":"10.00"},"quantity":-1,"size":"M","color":"black"}]"#;
        for saved in ["{not a cart", r#"{"a":1}"#, "null", negative_quantity] {
            let fixture = Fixture::new();
            fixture.storage.set(CART_STORAGE_KEY, saved).unwrap();

            let cart = fixture.cart();
            assert!(cart.is_empty(), "{saved} should load as an empty cart");
            assert_eq!(cart.total_items(), 0);
            assert_eq!(fixture.storage.get(CART_STORAGE_KEY).unwrap(), None);
        }
    }

    #[test]
    fn test_unreadable_saved_cart_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let saved = dir.path().join(format!("{CART_STORAGE_KEY}.json"));
        std::fs::write(&saved, [0xff, 0xfe, 0x00, 0x9f]).unwrap();
        let fixture = Fixture::new();

        let cart = CartStore::load(
            Arc::new(FileStorage::new(dir.path())),
            fixture.backend.clone(),
            fixture.session.clone(),
            fixture.scroll_lock.clone(),
            TIMEOUT,
        );

        assert!(cart.is_empty());
        assert!(!saved.exists());
    }

    #[test]
    fn test_open_close_holds_scroll_lock() {
        let fixture = Fixture::new();
        let cart = fixture.cart();

        cart.open();
        cart.open();
        assert!(cart.is_open());
        assert!(fixture.scroll_lock.is_locked());

        cart.close();
        assert!(!cart.is_open());
        assert!(!fixture.scroll_lock.is_locked());

        assert!(cart.toggle_open());
        assert!(fixture.scroll_lock.is_locked());
        assert!(!cart.toggle_open());
        assert!(!fixture.scroll_lock.is_locked());
    }

    #[test]
    fn test_dropping_open_cart_releases_scroll_lock() {
        let fixture = Fixture::new();
        let cart = fixture.cart();
        cart.open();
        drop(cart);
        assert!(!fixture.scroll_lock.is_locked());
    }

    #[tokio::test]
    async fn test_checkout_requires_sign_in() {
        let fixture = Fixture::new();
        let cart = fixture.cart();
        cart.add_line(&product("a", 1000), 1, "M", "black");

        let err = cart.checkout().await.unwrap_err();
        assert!(err.requires_sign_in());
        assert_eq!(cart.total_items(), 1);
        assert_eq!(fixture.backend.order_creates(), 0);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let fixture = Fixture::signed_in();
        let cart = fixture.cart();

        let err = cart.checkout().await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyCart));
        assert_eq!(fixture.backend.order_creates(), 0);
    }

    #[tokio::test]
    async fn test_checkout_success_clears_cart_and_closes_panel() {
        let fixture = Fixture::signed_in();
        let cart = fixture.cart();
        cart.add_line(&product("a", 1000), 2, "M", "black");
        cart.add_line(&product("b", 500), 1, "L", "black");
        cart.open();

        let receipt = cart.checkout().await.unwrap();

        assert_eq!(receipt.total.to_string(), "$25.00");
        assert_eq!(receipt.item_count, 3);
        assert!(cart.is_empty());
        assert!(!cart.is_open());
        assert!(!cart.is_checking_out());

        let orders = fixture.backend.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, receipt.order_id);
        assert_eq!(orders[0].status, OrderStatus::Pending);
        assert_eq!(orders[0].total, Decimal::new(2500, 2));

        let lines = fixture.backend.order_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.order_id == receipt.order_id));

        // The cleared cart is what a restart sees.
        assert!(fixture.cart().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_order_failure_keeps_cart() {
        let fixture = Fixture::signed_in();
        let cart = fixture.cart();
        cart.add_line(&product("a", 1000), 1, "M", "black");
        fixture.backend.fail_next_order();

        let err = cart.checkout().await.unwrap_err();
        assert!(matches!(err, StoreError::Remote(_)));
        assert_eq!(cart.total_items(), 1);
        assert_eq!(fixture.backend.line_creates(), 0);
        assert!(!cart.is_checking_out());
    }

    #[tokio::test]
    async fn test_checkout_lines_failure_keeps_cart_and_removes_order() {
        let fixture = Fixture::signed_in();
        let cart = fixture.cart();
        cart.add_line(&product("a", 1000), 2, "M", "black");
        let before = cart.lines();
        fixture.backend.fail_next_order_lines();

        let err = cart.checkout().await.unwrap_err();

        assert!(matches!(err, StoreError::Remote(RemoteError::Unavailable(_))));
        assert_eq!(cart.lines(), before);
        assert_eq!(fixture.backend.order_deletes(), 1);
        assert!(fixture.backend.orders().is_empty());
        assert!(!cart.is_checking_out());
    }

    #[tokio::test]
    async fn test_failed_compensation_still_reports_lines_failure() {
        let fixture = Fixture::signed_in();
        let cart = fixture.cart();
        cart.add_line(&product("a", 1000), 1, "M", "black");
        fixture.backend.fail_next_order_lines();
        fixture.backend.fail_next_delete_order();

        let err = cart.checkout().await.unwrap_err();

        assert!(err.is_remote());
        assert_eq!(cart.total_items(), 1);
        assert_eq!(fixture.backend.orders().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_checkout_is_rejected() {
        let fixture = Fixture::signed_in();
        fixture
            .backend
            .set_latency(Some(Duration::from_millis(50)));
        let cart = fixture.cart();
        cart.add_line(&product("a", 1000), 1, "M", "black");

        let (first, second) = tokio::join!(cart.checkout(), cart.checkout());

        assert!(first.is_ok());
        assert!(matches!(second, Err(StoreError::CheckoutInProgress)));
        assert_eq!(fixture.backend.order_creates(), 1);
        assert!(!cart.is_checking_out());
    }

    #[tokio::test]
    async fn test_checkout_times_out() {
        let fixture = Fixture::signed_in();
        fixture
            .backend
            .set_latency(Some(Duration::from_millis(200)));
        let cart = fixture.cart_with_timeout(Duration::from_millis(20));
        cart.add_line(&product("a", 1000), 1, "M", "black");

        let err = cart.checkout().await.unwrap_err();

        assert!(matches!(err, StoreError::Timeout));
        assert_eq!(cart.total_items(), 1);
        assert!(!cart.is_checking_out());
    }

    #[tokio::test]
    async fn test_cart_survives_sign_out() {
        let fixture = Fixture::signed_in();
        let cart = fixture.cart();
        cart.add_line(&product("a", 1000), 1, "M", "black");

        fixture.session.sign_out();
        assert_eq!(cart.total_items(), 1);
    }
}
