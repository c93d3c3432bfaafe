//! Smoke tests against a live hosted backend.
//!
//! These tests require `TEESHOP_BACKEND_URL` and `TEESHOP_BACKEND_ANON_KEY`;
//! the signed-in checks also need `TEESHOP_USER_ID` and
//! `TEESHOP_ACCESS_TOKEN`.
//!
//! Run with: cargo test -p teeshop-integration-tests --test live_backend -- --ignored

#![allow(clippy::unwrap_used)]

use teeshop_core::ProductId;
use teeshop_storefront::Storefront;
use teeshop_storefront::config::StorefrontConfig;

fn live_storefront() -> Storefront {
    let mut config = StorefrontConfig::from_env().unwrap();
    config.data_dir = tempfile::tempdir().unwrap().keep();
    Storefront::from_config(&config).unwrap()
}

#[tokio::test]
#[ignore = "Requires a live backend"]
async fn test_public_reviews_listing() {
    let storefront = live_storefront();

    let listing = storefront
        .reviews()
        .list(&ProductId::from("tshirt-001"))
        .await
        .unwrap();

    if let Some(average) = listing.average {
        assert!((1.0..=5.0).contains(&average));
    }
}

#[tokio::test]
#[ignore = "Requires a live backend and a signed-in user"]
async fn test_signed_in_reads() {
    let storefront = live_storefront();
    assert!(
        storefront.session().is_signed_in(),
        "set TEESHOP_USER_ID and TEESHOP_ACCESS_TOKEN"
    );

    storefront.wishlist().refresh().await.unwrap();
    let orders = storefront.orders().list().await.unwrap();
    for placed in &orders {
        assert!(placed.order.total >= rust_decimal::Decimal::ZERO);
    }
    storefront.profiles().current().await.unwrap();
}
