//! Cart and checkout.

use teeshop_core::{Price, ProductId};
use teeshop_storefront::Storefront;

use crate::CliError;
use crate::commands::catalog;

/// Print the cart lines and totals.
#[allow(clippy::print_stdout)]
pub fn show(storefront: &Storefront) {
    let cart = storefront.cart().snapshot();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.lines() {
        let options = [line.size.as_str(), line.color.as_str()]
            .into_iter()
            .filter(|o| !o.is_empty())
            .collect::<Vec<_>>()
            .join(" / ");
        println!(
            "{:>3} x {:<28} {:<14} {:>10}",
            line.quantity,
            line.product.name,
            options,
            Price::usd(line.line_total()).to_string()
        );
    }
    println!(
        "{} item(s), total {}",
        cart.total_items(),
        cart.total()
    );
}

/// Add a product after checking the chosen size and color.
///
/// # Errors
///
/// Returns `CliError::UnknownProduct` for IDs outside the catalog and
/// `CliError::InvalidOption` for a missing or unknown size or color.
pub fn add(
    storefront: &Storefront,
    id: &ProductId,
    quantity: u32,
    size: Option<&str>,
    color: Option<&str>,
) -> Result<(), CliError> {
    if quantity == 0 {
        return Err(CliError::InvalidOption(
            "quantity must be at least 1".to_string(),
        ));
    }

    let product = catalog::require(storefront, id)?;
    let size = choose("size", size, &product.sizes)?;
    let color = choose("color", color, &product.colors)?;

    storefront.cart().add_line(product, quantity, size, color);
    show(storefront);
    Ok(())
}

/// Place the order.
///
/// # Errors
///
/// Returns `CliError::Store` if checkout is rejected or fails.
#[allow(clippy::print_stdout)]
pub async fn checkout(storefront: &Storefront) -> Result<(), CliError> {
    let receipt = storefront.cart().checkout().await?;
    println!(
        "Order {} placed: {} item(s), total {}",
        receipt.order_id, receipt.item_count, receipt.total
    );
    Ok(())
}

/// Validate an option against what the product offers.
///
/// Products without options accept only an empty choice.
fn choose<'a>(
    what: &str,
    chosen: Option<&'a str>,
    offered: &[String],
) -> Result<&'a str, CliError> {
    match chosen {
        None if offered.is_empty() => Ok(""),
        None => Err(CliError::InvalidOption(format!(
            "choose a {what}: {}",
            offered.join(", ")
        ))),
        Some(value) if offered.iter().any(|o| o == value) => Ok(value),
        Some(value) => Err(CliError::InvalidOption(format!(
            "{value} is not an available {what}; choose one of: {}",
            offered.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose() {
        let sizes = vec!["S".to_string(), "M".to_string()];

        assert!(matches!(choose("size", Some("M"), &sizes), Ok("M")));
        assert!(matches!(choose("size", None, &[]), Ok("")));
        assert!(matches!(
            choose("size", None, &sizes),
            Err(CliError::InvalidOption(_))
        ));
        assert!(matches!(
            choose("size", Some("XL"), &sizes),
            Err(CliError::InvalidOption(_))
        ));
    }
}
