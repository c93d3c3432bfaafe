//! In-process backend.
//!
//! Holds every table in memory behind a mutex. Used by tests and by the CLI
//! when no hosted backend is configured. Failures can be injected per table
//! group, and call counters let tests assert which requests were made.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use teeshop_core::{
    NewOrder, NewOrderLine, NewReview, NewWishlistEntry, Order, OrderId, OrderLine, OrderLineId,
    ProductId, Profile, Review, ReviewId, UserId, WishlistEntry, WishlistEntryId,
};

use super::{OrderStore, ProfileStore, RemoteError, ReviewStore, WishlistBackend};

#[derive(Default)]
struct Tables {
    orders: Vec<Order>,
    order_lines: Vec<OrderLine>,
    wishlist: Vec<WishlistEntry>,
    reviews: Vec<Review>,
    profiles: Vec<Profile>,
}

#[derive(Default)]
struct Faults {
    next_order: AtomicBool,
    next_order_lines: AtomicBool,
    next_delete_order: AtomicBool,
    lines_fetch: AtomicBool,
    wishlist: AtomicBool,
    reviews: AtomicBool,
}

#[derive(Default)]
struct Counters {
    order_creates: AtomicUsize,
    line_creates: AtomicUsize,
    order_deletes: AtomicUsize,
    wishlist_fetches: AtomicUsize,
    profile_fetches: AtomicUsize,
}

/// Backend that keeps all rows in memory.
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    faults: Faults,
    counters: Counters,
    latency: Mutex<Option<Duration>>,
}

fn injected(what: &str) -> RemoteError {
    RemoteError::Unavailable(format!("injected failure: {what}"))
}

fn take(flag: &AtomicBool) -> bool {
    flag.swap(false, Ordering::SeqCst)
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A poisoned lock only means a test panicked mid-write; the rows are still usable.
        self.tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn delay(&self) {
        let latency = *self
            .latency
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self
            .latency
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = latency;
    }

    /// Make the next `create_order` fail.
    pub fn fail_next_order(&self) {
        self.faults.next_order.store(true, Ordering::SeqCst);
    }

    /// Make the next `create_order_lines` fail.
    pub fn fail_next_order_lines(&self) {
        self.faults.next_order_lines.store(true, Ordering::SeqCst);
    }

    /// Make the next `delete_order` fail.
    pub fn fail_next_delete_order(&self) {
        self.faults.next_delete_order.store(true, Ordering::SeqCst);
    }

    /// Make every `lines_for` call fail until turned off again.
    pub fn fail_lines_fetch(&self, fail: bool) {
        self.faults.lines_fetch.store(fail, Ordering::SeqCst);
    }

    /// Make every wishlist call fail until turned off again.
    pub fn fail_wishlist(&self, fail: bool) {
        self.faults.wishlist.store(fail, Ordering::SeqCst);
    }

    /// Make every review call fail until turned off again.
    pub fn fail_reviews(&self, fail: bool) {
        self.faults.reviews.store(fail, Ordering::SeqCst);
    }

    /// Seed a profile row.
    pub fn put_profile(&self, profile: Profile) {
        let mut tables = self.tables();
        tables.profiles.retain(|p| p.id != profile.id);
        tables.profiles.push(profile);
    }

    /// Seed an order row as if it had been created at `created_at`.
    pub fn put_order(&self, order: Order) {
        self.tables().orders.push(order);
    }

    /// Every stored order, in insertion order.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.tables().orders.clone()
    }

    /// Every stored order line.
    #[must_use]
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.tables().order_lines.clone()
    }

    /// Every stored wishlist entry.
    #[must_use]
    pub fn wishlist_entries(&self) -> Vec<WishlistEntry> {
        self.tables().wishlist.clone()
    }

    #[must_use]
    pub fn order_creates(&self) -> usize {
        self.counters.order_creates.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn line_creates(&self) -> usize {
        self.counters.line_creates.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn order_deletes(&self) -> usize {
        self.counters.order_deletes.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn wishlist_fetches(&self) -> usize {
        self.counters.wishlist_fetches.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn profile_fetches(&self) -> usize {
        self.counters.profile_fetches.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables();
        f.debug_struct("MemoryBackend")
            .field("orders", &tables.orders.len())
            .field("order_lines", &tables.order_lines.len())
            .field("wishlist", &tables.wishlist.len())
            .field("reviews", &tables.reviews.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OrderStore for MemoryBackend {
    async fn create_order(&self, order: &NewOrder) -> Result<Order, RemoteError> {
        self.delay().await;
        self.counters.order_creates.fetch_add(1, Ordering::SeqCst);
        if take(&self.faults.next_order) {
            return Err(injected("create order"));
        }

        let row = Order {
            id: OrderId::generate(),
            user_id: order.user_id,
            created_at: Utc::now(),
            status: order.status,
            total: order.total,
            tracking_number: None,
            shipping_method: None,
            shipping_address: None,
            estimated_delivery: None,
        };
        self.tables().orders.push(row.clone());
        Ok(row)
    }

    async fn create_order_lines(&self, lines: &[NewOrderLine]) -> Result<(), RemoteError> {
        self.delay().await;
        self.counters.line_creates.fetch_add(1, Ordering::SeqCst);
        if take(&self.faults.next_order_lines) {
            return Err(injected("create order lines"));
        }

        let mut tables = self.tables();
        if let Some(missing) = lines
            .iter()
            .find(|l| !tables.orders.iter().any(|o| o.id == l.order_id))
        {
            return Err(RemoteError::Status {
                status: 409,
                message: format!("order {} does not exist", missing.order_id),
            });
        }
        tables
            .order_lines
            .extend(lines.iter().map(|l| OrderLine {
                id: OrderLineId::generate(),
                order_id: l.order_id,
                product_id: l.product_id.clone(),
                quantity: l.quantity,
                size: l.size.clone(),
                color: l.color.clone(),
                price: l.price,
            }));
        drop(tables);
        Ok(())
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<(), RemoteError> {
        self.delay().await;
        self.counters.order_deletes.fetch_add(1, Ordering::SeqCst);
        if take(&self.faults.next_delete_order) {
            return Err(injected("delete order"));
        }

        let mut tables = self.tables();
        tables.orders.retain(|o| o.id != order_id);
        tables.order_lines.retain(|l| l.order_id != order_id);
        drop(tables);
        Ok(())
    }

    async fn orders_for(&self, user_id: UserId) -> Result<Vec<Order>, RemoteError> {
        self.delay().await;
        let mut orders: Vec<Order> = self
            .tables()
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn lines_for(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RemoteError> {
        self.delay().await;
        if self.faults.lines_fetch.load(Ordering::SeqCst) {
            return Err(injected("fetch order lines"));
        }
        Ok(self
            .tables()
            .order_lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl WishlistBackend for MemoryBackend {
    async fn insert_entry(&self, entry: &NewWishlistEntry) -> Result<(), RemoteError> {
        self.delay().await;
        if self.faults.wishlist.load(Ordering::SeqCst) {
            return Err(injected("insert wishlist entry"));
        }

        let mut tables = self.tables();
        if tables
            .wishlist
            .iter()
            .any(|e| e.user_id == entry.user_id && e.product_id == entry.product_id)
        {
            return Err(RemoteError::Status {
                status: 409,
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }
        tables.wishlist.push(WishlistEntry {
            id: WishlistEntryId::generate(),
            user_id: entry.user_id,
            product_id: entry.product_id.clone(),
            created_at: Utc::now(),
        });
        drop(tables);
        Ok(())
    }

    async fn delete_entry(
        &self,
        user_id: UserId,
        product_id: &ProductId,
    ) -> Result<(), RemoteError> {
        self.delay().await;
        if self.faults.wishlist.load(Ordering::SeqCst) {
            return Err(injected("delete wishlist entry"));
        }

        self.tables()
            .wishlist
            .retain(|e| !(e.user_id == user_id && &e.product_id == product_id));
        Ok(())
    }

    async fn entries_for(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, RemoteError> {
        self.delay().await;
        self.counters.wishlist_fetches.fetch_add(1, Ordering::SeqCst);
        if self.faults.wishlist.load(Ordering::SeqCst) {
            return Err(injected("fetch wishlist"));
        }

        Ok(self
            .tables()
            .wishlist
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReviewStore for MemoryBackend {
    async fn insert_review(&self, review: &NewReview) -> Result<Review, RemoteError> {
        self.delay().await;
        if self.faults.reviews.load(Ordering::SeqCst) {
            return Err(injected("insert review"));
        }

        let row = Review {
            id: ReviewId::generate(),
            user_id: review.user_id,
            product_id: review.product_id.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: Utc::now(),
        };
        self.tables().reviews.push(row.clone());
        Ok(row)
    }

    async fn reviews_for(&self, product_id: &ProductId) -> Result<Vec<Review>, RemoteError> {
        self.delay().await;
        if self.faults.reviews.load(Ordering::SeqCst) {
            return Err(injected("fetch reviews"));
        }

        // Newest first; ties keep the later insert first.
        let mut reviews: Vec<Review> = self
            .tables()
            .reviews
            .iter()
            .rev()
            .filter(|r| &r.product_id == product_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }
}

#[async_trait]
impl ProfileStore for MemoryBackend {
    async fn profile(&self, user_id: UserId) -> Result<Option<Profile>, RemoteError> {
        self.delay().await;
        self.counters.profile_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .tables()
            .profiles
            .iter()
            .find(|p| p.id == user_id)
            .cloned())
    }

    async fn update_full_name(
        &self,
        user_id: UserId,
        full_name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RemoteError> {
        self.delay().await;
        let mut tables = self.tables();
        match tables.profiles.iter_mut().find(|p| p.id == user_id) {
            Some(profile) => {
                profile.full_name = Some(full_name.to_string());
                profile.updated_at = Some(updated_at);
            }
            None => tables.profiles.push(Profile {
                id: user_id,
                full_name: Some(full_name.to_string()),
                avatar_url: None,
                updated_at: Some(updated_at),
            }),
        }
        drop(tables);
        Ok(())
    }
}
