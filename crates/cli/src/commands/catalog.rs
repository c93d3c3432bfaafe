//! Catalog browsing.

use teeshop_core::{Catalog, Product, ProductFilter, ProductId, SortOrder};
use teeshop_storefront::Storefront;

use crate::CliError;

/// Merchandising rail to restrict a listing to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rail {
    Featured,
    BestSellers,
    NewArrivals,
}

/// List products matching `filter`, optionally limited to one rail.
#[allow(clippy::print_stdout)]
pub fn products(rail: Option<Rail>, filter: &ProductFilter, sort: SortOrder) {
    let catalog = Catalog::builtin();
    let products: Vec<&Product> = catalog
        .browse(filter, sort)
        .into_iter()
        .filter(|p| match rail {
            None => true,
            Some(Rail::Featured) => p.flags.featured,
            Some(Rail::BestSellers) => p.flags.best_seller,
            Some(Rail::NewArrivals) => p.flags.new,
        })
        .collect();

    if products.is_empty() {
        println!("No products match.");
        return;
    }
    for product in products {
        println!("{}", summary(product));
    }
}

/// Show everything about one product.
///
/// # Errors
///
/// Returns `CliError::UnknownProduct` if the ID is not in the catalog.
#[allow(clippy::print_stdout)]
pub fn product(id: &ProductId) -> Result<(), CliError> {
    let catalog = Catalog::builtin();
    let product = catalog
        .get(id)
        .ok_or_else(|| CliError::UnknownProduct(id.clone()))?;

    println!("{}", product.name);
    println!("  id:       {}", product.id);
    println!("  category: {}", product.category);
    println!("  price:    {}", price_label(product));
    println!("  colors:   {}", product.colors.join(", "));
    println!("  sizes:    {}", product.sizes.join(", "));
    println!();
    println!("{}", product.description);
    Ok(())
}

/// Look up a product in the storefront's catalog.
///
/// # Errors
///
/// Returns `CliError::UnknownProduct` if the ID is not in the catalog.
pub fn require<'a>(storefront: &'a Storefront, id: &ProductId) -> Result<&'a Product, CliError> {
    storefront
        .catalog()
        .get(id)
        .ok_or_else(|| CliError::UnknownProduct(id.clone()))
}

/// One-line listing entry.
pub fn summary(product: &Product) -> String {
    let mut badges = Vec::new();
    if product.flags.new {
        badges.push("new");
    }
    if product.flags.best_seller {
        badges.push("best seller");
    }
    if product.is_on_sale() {
        badges.push("sale");
    }

    let mut line = format!(
        "{:<12} {:<28} {:>16}  {}",
        product.id.as_str(),
        product.name,
        price_label(product),
        product.category
    );
    if !badges.is_empty() {
        line.push_str(&format!("  [{}]", badges.join(", ")));
    }
    line
}

fn price_label(product: &Product) -> String {
    match product.sale {
        Some(sale) => format!(
            "{} (was {})",
            teeshop_core::Price::usd(sale.price),
            product.list_price()
        ),
        None => product.list_price().to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use teeshop_core::Sale;

    use super::*;

    #[test]
    fn test_summary_shows_badges_and_sale_price() {
        let mut product = Catalog::builtin()
            .get(&ProductId::from("tshirt-001"))
            .cloned()
            .unwrap();
        product.sale = Some(Sale {
            price: Decimal::new(2999, 2),
        });

        let line = summary(&product);
        assert!(line.starts_with("tshirt-001"));
        assert!(line.contains("$29.99 (was $39.99)"));
        assert!(line.contains("[best seller, sale]"));
    }
}
