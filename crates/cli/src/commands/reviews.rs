//! Product reviews.

use teeshop_core::ProductId;
use teeshop_storefront::Storefront;

use crate::CliError;
use crate::commands::catalog;

/// Submit a review.
///
/// # Errors
///
/// Returns `CliError::UnknownProduct` for IDs outside the catalog and
/// `CliError::Store` if the review is rejected or fails.
#[allow(clippy::print_stdout)]
pub async fn submit(
    storefront: &Storefront,
    id: &ProductId,
    rating: u8,
    comment: Option<&str>,
) -> Result<(), CliError> {
    let product = catalog::require(storefront, id)?;
    let review = storefront.reviews().submit(id, rating, comment).await?;
    println!(
        "Thanks! Your {} review of {} was saved.",
        review.rating, product.name
    );
    Ok(())
}

/// Print the reviews of a product.
///
/// # Errors
///
/// Returns `CliError::UnknownProduct` for IDs outside the catalog and
/// `CliError::Store` if the reviews cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn list(storefront: &Storefront, id: &ProductId) -> Result<(), CliError> {
    let product = catalog::require(storefront, id)?;
    let listing = storefront.reviews().list(id).await?;

    match listing.average {
        Some(average) => println!(
            "{}: {average:.1}/5 from {} review(s)",
            product.name,
            listing.count()
        ),
        None => {
            println!("{}: no reviews yet", product.name);
            return Ok(());
        }
    }

    for entry in &listing.reviews {
        println!(
            "\n{}  {}  {}",
            stars(entry.review.rating.stars()),
            entry.author,
            entry.review.created_at.format("%Y-%m-%d")
        );
        if let Some(comment) = &entry.review.comment {
            println!("  {comment}");
        }
    }
    Ok(())
}

fn stars(count: u8) -> String {
    let filled = usize::from(count);
    format!("{}{}", "*".repeat(filled), ".".repeat(5_usize.saturating_sub(filled)))
}
