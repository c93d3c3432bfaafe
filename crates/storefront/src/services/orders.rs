//! Order history.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::instrument;

use teeshop_core::{Order, OrderWithLines};

use crate::backend::OrderStore;
use crate::error::{StoreError, bounded};
use crate::session::SessionProvider;

/// Read-only view of the signed-in user's past orders.
pub struct OrderHistory {
    orders: Arc<dyn OrderStore>,
    session: SessionProvider,
    timeout: Duration,
}

impl OrderHistory {
    #[must_use]
    pub fn new(orders: Arc<dyn OrderStore>, session: SessionProvider, timeout: Duration) -> Self {
        Self {
            orders,
            session,
            timeout,
        }
    }

    /// The signed-in user's orders with their lines, newest first.
    ///
    /// Lines are fetched for all orders concurrently. An order whose lines
    /// cannot be loaded is returned without lines rather than failing the
    /// whole listing.
    ///
    /// # Errors
    ///
    /// - `StoreError::Unauthenticated` if nobody is signed in
    /// - `StoreError::Remote` or `StoreError::Timeout` if the orders cannot
    ///   be fetched
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<OrderWithLines>, StoreError> {
        let user = self.session.current().ok_or(StoreError::Unauthenticated)?;

        let orders = bounded(self.timeout, self.orders.orders_for(user.id)).await?;
        tracing::debug!(orders = orders.len(), "Fetched orders");

        Ok(join_all(orders.into_iter().map(|order| self.with_lines(order))).await)
    }

    async fn with_lines(&self, order: Order) -> OrderWithLines {
        let lines = match bounded(self.timeout, self.orders.lines_for(order.id)).await {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "Failed to load order lines");
                Vec::new()
            }
        };
        OrderWithLines { order, lines }
    }
}
