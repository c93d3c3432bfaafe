//! Wishlist following the session across sign-in and sign-out.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use teeshop_core::ProductId;
use teeshop_integration_tests::TestContext;
use teeshop_storefront::session::CurrentUser;

async fn eventually(check: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_wishlist_reloads_for_returning_user() {
    let ctx = TestContext::new().unwrap();
    let task = Arc::clone(ctx.storefront.wishlist()).follow_session();
    let wishlist = ctx.storefront.wishlist();

    let user = ctx.sign_in();
    wishlist.add(&ProductId::from("tshirt-002")).await.unwrap();
    wishlist.add(&ProductId::from("tshirt-007")).await.unwrap();
    assert_eq!(wishlist.len(), 2);

    ctx.sign_out();
    eventually(|| wishlist.is_empty()).await;
    assert_eq!(ctx.backend.wishlist_entries().len(), 2);

    ctx.storefront.session().sign_in(CurrentUser::new(user));
    eventually(|| wishlist.len() == 2).await;
    let names: Vec<String> = wishlist
        .products(ctx.storefront.catalog())
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names.len(), 2);

    task.abort();
}

#[tokio::test]
async fn test_switching_users_never_shows_previous_entries() {
    let ctx = TestContext::new().unwrap();
    let task = Arc::clone(ctx.storefront.wishlist()).follow_session();
    let wishlist = ctx.storefront.wishlist();

    ctx.sign_in();
    wishlist.add(&ProductId::from("tshirt-001")).await.unwrap();

    ctx.sign_in();
    eventually(|| !wishlist.is_loading() && wishlist.is_empty()).await;
    assert!(!wishlist.contains(&ProductId::from("tshirt-001")));

    wishlist.add(&ProductId::from("tshirt-008")).await.unwrap();
    assert_eq!(wishlist.len(), 1);
    assert_eq!(ctx.backend.wishlist_entries().len(), 2);

    task.abort();
}

#[tokio::test]
async fn test_backend_outage_keeps_last_known_entries() {
    let ctx = TestContext::new().unwrap();
    let wishlist = ctx.storefront.wishlist();
    ctx.sign_in();
    wishlist.add(&ProductId::from("tshirt-006")).await.unwrap();

    ctx.backend.fail_wishlist(true);
    let err = wishlist.refresh().await.unwrap_err();
    assert!(err.is_remote());
    assert!(wishlist.contains(&ProductId::from("tshirt-006")));

    ctx.backend.fail_wishlist(false);
    wishlist.remove(&ProductId::from("tshirt-006")).await.unwrap();
    assert!(wishlist.is_empty());
}
