//! Product reference data.
//!
//! Products are read-only: they come from the static [`Catalog`](crate::Catalog)
//! and are never written by the storefront.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Merchandising flags shown as badges and used for the home page rails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductFlags {
    /// Listed under new arrivals.
    #[serde(default)]
    pub new: bool,
    /// Listed under best sellers.
    #[serde(default)]
    pub best_seller: bool,
    /// Listed under featured products.
    #[serde(default)]
    pub featured: bool,
}

/// A markdown applied to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    /// Price charged while the sale is active.
    pub price: Decimal,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// List price in dollars.
    pub price: Decimal,
    pub colors: Vec<String>,
    /// Empty when the product is one-size.
    pub sizes: Vec<String>,
    pub images: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub flags: ProductFlags,
    #[serde(default)]
    pub sale: Option<Sale>,
}

impl Product {
    /// Whether a markdown is active.
    #[must_use]
    pub const fn is_on_sale(&self) -> bool {
        self.sale.is_some()
    }

    /// The price a customer pays for one unit right now.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.sale.map_or(self.price, |sale| sale.price)
    }

    /// The list price as a display-ready [`Price`].
    #[must_use]
    pub fn list_price(&self) -> Price {
        Price::usd(self.price)
    }

    /// First image, used for thumbnails.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product is offered in `color`.
    #[must_use]
    pub fn has_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c == color)
    }

    /// Whether the product is offered in `size`.
    #[must_use]
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tee() -> Product {
        Product {
            id: ProductId::from("tshirt-test"),
            name: "Test Tee".to_string(),
            description: String::new(),
            price: Decimal::new(4000, 2),
            colors: vec!["Black".to_string()],
            sizes: vec!["M".to_string()],
            images: vec!["https://img.example/1.jpg".to_string()],
            category: "Basic".to_string(),
            flags: ProductFlags::default(),
            sale: None,
        }
    }

    #[test]
    fn test_effective_price_without_sale() {
        let product = tee();
        assert!(!product.is_on_sale());
        assert_eq!(product.effective_price(), Decimal::new(4000, 2));
    }

    #[test]
    fn test_effective_price_with_sale() {
        let product = Product {
            sale: Some(Sale {
                price: Decimal::new(2999, 2),
            }),
            ..tee()
        };
        assert!(product.is_on_sale());
        assert_eq!(product.effective_price(), Decimal::new(2999, 2));
        assert_eq!(product.list_price().to_string(), "$40.00");
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let json = r#"{
            "id": "x", "name": "X", "description": "", "price": "10.00",
            "colors": [], "sizes": [], "images": [], "category": "Basic"
        }"#;
        let product: Product = serde_json::from_str(json).expect("valid product");
        assert_eq!(product.flags, ProductFlags::default());
        assert!(product.sale.is_none());
        assert!(product.thumbnail().is_none());
    }
}
