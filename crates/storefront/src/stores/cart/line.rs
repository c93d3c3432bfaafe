//! Cart lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use teeshop_core::{Price, Product, ProductId};

/// Product data cached on a line so the cart renders without the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    /// Price per unit when the line was first added.
    pub unit_price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.effective_price(),
            image: product.thumbnail().map(String::from),
        }
    }
}

/// One purchasable configuration in the cart.
///
/// Lines are identified by product, size and color; see [`LineKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: CartProduct,
    pub quantity: u32,
    /// Empty when the product has no sizes.
    #[serde(default)]
    pub size: String,
    /// Empty when the product has no colors.
    #[serde(default)]
    pub color: String,
}

impl CartLine {
    #[must_use]
    pub fn key(&self) -> LineKey<'_> {
        LineKey {
            product_id: &self.product.id,
            size: &self.size,
            color: &self.color,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.unit_price * Decimal::from(self.quantity)
    }

    #[must_use]
    pub fn unit_price(&self) -> Price {
        Price::usd(self.product.unit_price)
    }
}

/// Identity of a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineKey<'a> {
    pub product_id: &'a ProductId,
    pub size: &'a str,
    pub color: &'a str,
}

impl<'a> LineKey<'a> {
    #[must_use]
    pub const fn new(product_id: &'a ProductId, size: &'a str, color: &'a str) -> Self {
        Self {
            product_id,
            size,
            color,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_product_uses_sale_price() {
        let mut product = teeshop_core::Catalog::builtin()
            .get(&ProductId::from("tshirt-001"))
            .cloned()
            .unwrap();
        product.sale = Some(teeshop_core::Sale {
            price: Decimal::new(2999, 2),
        });

        let cached = CartProduct::from(&product);
        assert_eq!(cached.unit_price, Decimal::new(2999, 2));
        assert_eq!(cached.image.as_deref(), product.thumbnail());
    }

    #[test]
    fn test_key_distinguishes_size_and_color() {
        let product = CartProduct {
            id: ProductId::from("tshirt-001"),
            name: "Tee".to_string(),
            unit_price: Decimal::TEN,
            image: None,
        };
        let line = |size: &str, color: &str| CartLine {
            product: product.clone(),
            quantity: 1,
            size: size.to_string(),
            color: color.to_string(),
        };

        assert_eq!(line("M", "Black").key(), line("M", "Black").key());
        assert_ne!(line("M", "Black").key(), line("L", "Black").key());
        assert_ne!(line("M", "Black").key(), line("M", "White").key());
    }
}
