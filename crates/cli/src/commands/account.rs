//! Signed-in user's wishlist, orders and profile.

use teeshop_core::Price;
use teeshop_storefront::{StoreError, Storefront};

use crate::CliError;
use crate::commands::catalog::summary;

/// Refresh and print the wishlist.
///
/// # Errors
///
/// Returns `CliError::Store` if the wishlist cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn wishlist(storefront: &Storefront) -> Result<(), CliError> {
    if !storefront.session().is_signed_in() {
        return Err(StoreError::Unauthenticated.into());
    }
    let wishlist = storefront.wishlist();
    wishlist.refresh().await?;

    let products = wishlist.products(storefront.catalog());
    if products.is_empty() {
        println!("Your wishlist is empty.");
        return Ok(());
    }
    for product in &products {
        println!("{}", summary(product));
    }
    Ok(())
}

/// Print the order history.
///
/// # Errors
///
/// Returns `CliError::Store` if the orders cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn orders(storefront: &Storefront) -> Result<(), CliError> {
    let orders = storefront.orders().list().await?;
    if orders.is_empty() {
        println!("You have no orders yet.");
        return Ok(());
    }

    for entry in &orders {
        let order = &entry.order;
        let progress = order
            .status
            .tracking_step()
            .map_or_else(|| "-".to_string(), |step| format!("{step}/3"));
        println!(
            "{}  {}  {:<10} step {}  {} item(s)  {}",
            order.created_at.format("%Y-%m-%d"),
            order.id,
            order.status,
            progress,
            entry.item_count(),
            order.total_price()
        );
        if let Some(tracking) = &order.tracking_number {
            println!("    tracking: {tracking}");
        }
        if let Some(eta) = order.estimated_delivery {
            println!("    estimated delivery: {eta}");
        }
        for line in &entry.lines {
            let name = storefront
                .catalog()
                .get(&line.product_id)
                .map_or(line.product_id.as_str(), |p| p.name.as_str());
            println!(
                "    {} x {} ({} / {})  {}",
                line.quantity,
                name,
                line.size,
                line.color,
                Price::usd(line.line_total())
            );
        }
    }
    Ok(())
}

/// Print the signed-in user's profile.
///
/// # Errors
///
/// Returns `CliError::Store` if the profile cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn profile(storefront: &Storefront) -> Result<(), CliError> {
    let profile = storefront.profiles().current().await?;
    let email = storefront
        .session()
        .current()
        .and_then(|u| u.email)
        .unwrap_or_default();

    match profile {
        Some(profile) => {
            println!("name:   {}", profile.display_name().unwrap_or("(not set)"));
            if let Some(avatar) = &profile.avatar_url {
                println!("avatar: {avatar}");
            }
        }
        None => println!("name:   (not set)"),
    }
    if !email.is_empty() {
        println!("email:  {email}");
    }
    Ok(())
}
