//! Order and order-line records.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, OrderLineId, OrderStatus, Price, ProductId, UserId};

/// Insert payload for the `orders` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total: Decimal,
    pub status: OrderStatus,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Decimal,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub shipping_method: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<NaiveDate>,
}

impl Order {
    /// The order total as a display-ready [`Price`].
    #[must_use]
    pub fn total_price(&self) -> Price {
        Price::usd(self.total)
    }
}

/// Insert payload for the `order_items` table.
///
/// `price` is the unit price at the time of purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub price: Decimal,
}

/// A purchased line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub price: Decimal,
}

impl OrderLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// An order together with its lines, as shown in the order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

impl OrderWithLines {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_row_deserializes_with_numeric_total() {
        let json = r#"{
            "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "user_id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "created_at": "2024-03-01T12:00:00+00:00",
            "status": "shipped",
            "total": 89.98,
            "tracking_number": "1Z999",
            "estimated_delivery": "2024-03-05"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.total, Decimal::new(8998, 2));
        assert_eq!(order.total_price().to_string(), "$89.98");
        assert!(order.shipping_method.is_none());
        assert_eq!(
            order.estimated_delivery,
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }

    #[test]
    fn test_line_total_and_item_count() {
        let order_id = OrderId::generate();
        let line = |qty, cents| OrderLine {
            id: OrderLineId::generate(),
            order_id,
            product_id: ProductId::from("tshirt-001"),
            quantity: qty,
            size: "M".to_string(),
            color: "Black".to_string(),
            price: Decimal::new(cents, 2),
        };
        let order = OrderWithLines {
            order: Order {
                id: order_id,
                user_id: UserId::generate(),
                created_at: Utc::now(),
                status: OrderStatus::Pending,
                total: Decimal::new(2500, 2),
                tracking_number: None,
                shipping_method: None,
                shipping_address: None,
                estimated_delivery: None,
            },
            lines: vec![line(2, 1000), line(1, 500)],
        };
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.lines[0].line_total(), Decimal::new(2000, 2));
    }
}
