//! Reviews with author names resolved from profiles.

#![allow(clippy::unwrap_used)]

use teeshop_core::ProductId;
use teeshop_integration_tests::TestContext;
use teeshop_storefront::StoreError;
use teeshop_storefront::services::ANONYMOUS_AUTHOR;

#[tokio::test]
async fn test_reviews_show_authors_and_average() {
    let ctx = TestContext::new().unwrap();
    let product = ProductId::from("tshirt-003");

    ctx.sign_in();
    ctx.storefront
        .profiles()
        .update_full_name("  Robin Vale ")
        .await
        .unwrap();
    ctx.storefront
        .reviews()
        .submit(&product, 5, Some("Fits true to size"))
        .await
        .unwrap();

    ctx.sign_in();
    ctx.storefront
        .reviews()
        .submit(&product, 2, Some("   "))
        .await
        .unwrap();

    let listing = ctx.storefront.reviews().list(&product).await.unwrap();
    assert_eq!(listing.count(), 2);
    assert_eq!(listing.average, Some(3.5));

    let authors: Vec<&str> = listing.reviews.iter().map(|r| r.author.as_str()).collect();
    assert_eq!(authors, [ANONYMOUS_AUTHOR, "Robin Vale"]);
    let newest = listing.reviews.first().unwrap();
    assert_eq!(newest.review.rating.stars(), 2);
    assert_eq!(newest.review.comment, None);

    let other = ctx
        .storefront
        .reviews()
        .list(&ProductId::from("tshirt-001"))
        .await
        .unwrap();
    assert_eq!(other.count(), 0);
    assert_eq!(other.average, None);
}

#[tokio::test]
async fn test_invalid_or_anonymous_reviews_are_rejected() {
    let ctx = TestContext::new().unwrap();
    let product = ProductId::from("tshirt-005");

    let err = ctx
        .storefront
        .reviews()
        .submit(&product, 4, None)
        .await
        .unwrap_err();
    assert!(err.requires_sign_in());

    ctx.sign_in();
    let err = ctx
        .storefront
        .reviews()
        .submit(&product, 6, None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidRating(_)));

    let listing = ctx.storefront.reviews().list(&product).await.unwrap();
    assert_eq!(listing.count(), 0);
}

#[tokio::test]
async fn test_renamed_author_shows_new_name() {
    let ctx = TestContext::new().unwrap();
    let product = ProductId::from("tshirt-008");
    ctx.sign_in();
    let profiles = ctx.storefront.profiles();
    profiles.update_full_name("Sam").await.unwrap();
    ctx.storefront
        .reviews()
        .submit(&product, 4, None)
        .await
        .unwrap();
    let before = ctx.storefront.reviews().list(&product).await.unwrap();
    assert_eq!(before.reviews.first().unwrap().author, "Sam");

    profiles.update_full_name("Sam Okafor").await.unwrap();

    let after = ctx.storefront.reviews().list(&product).await.unwrap();
    assert_eq!(after.reviews.first().unwrap().author, "Sam Okafor");
    let current = profiles.current().await.unwrap().unwrap();
    assert_eq!(current.full_name.as_deref(), Some("Sam Okafor"));
}
