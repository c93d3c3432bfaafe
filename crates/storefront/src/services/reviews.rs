//! Product reviews.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::instrument;

use teeshop_core::{NewReview, ProductId, Rating, Review, UserId, average_rating};

use crate::backend::ReviewStore;
use crate::error::{StoreError, add_breadcrumb, bounded};
use crate::session::SessionProvider;

use super::profile::{ANONYMOUS_AUTHOR, Profiles};

/// A review with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoredReview {
    pub review: Review,
    pub author: String,
}

/// All reviews of one product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductReviews {
    /// Newest first.
    pub reviews: Vec<AuthoredReview>,
    /// Mean star rating, `None` without reviews.
    pub average: Option<f64>,
}

impl ProductReviews {
    #[must_use]
    pub fn count(&self) -> usize {
        self.reviews.len()
    }
}

/// Review submission and listing.
pub struct Reviews {
    store: Arc<dyn ReviewStore>,
    profiles: Arc<Profiles>,
    session: SessionProvider,
    timeout: Duration,
}

impl Reviews {
    #[must_use]
    pub fn new(
        store: Arc<dyn ReviewStore>,
        profiles: Arc<Profiles>,
        session: SessionProvider,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            profiles,
            session,
            timeout,
        }
    }

    /// Review `product_id` as the signed-in user.
    ///
    /// The rating is validated before anything is sent. A blank comment is
    /// stored as no comment.
    ///
    /// # Errors
    ///
    /// - `StoreError::Unauthenticated` if nobody is signed in
    /// - `StoreError::InvalidRating` if `stars` is not between 1 and 5
    /// - `StoreError::Remote` or `StoreError::Timeout` if the submission fails
    #[instrument(skip(self, comment), fields(product_id = %product_id))]
    pub async fn submit(
        &self,
        product_id: &ProductId,
        stars: u8,
        comment: Option<&str>,
    ) -> Result<Review, StoreError> {
        let user = self.session.current().ok_or(StoreError::Unauthenticated)?;
        let rating = Rating::new(stars)?;

        let review = NewReview {
            user_id: user.id,
            product_id: product_id.clone(),
            rating,
            comment: comment
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
        };
        let stored = bounded(self.timeout, self.store.insert_review(&review)).await?;
        add_breadcrumb(
            "reviews",
            "Submitted review",
            Some(&[("product_id", product_id.as_str())]),
        );
        Ok(stored)
    }

    /// Reviews of `product_id`, newest first, with author names.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Remote` or `StoreError::Timeout` if the reviews
    /// cannot be fetched. Author lookups never fail the listing.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn list(&self, product_id: &ProductId) -> Result<ProductReviews, StoreError> {
        let reviews = bounded(self.timeout, self.store.reviews_for(product_id)).await?;
        let average = average_rating(&reviews);

        let mut authors: Vec<UserId> = Vec::new();
        for review in &reviews {
            if !authors.contains(&review.user_id) {
                authors.push(review.user_id);
            }
        }

        let names: HashMap<UserId, String> = join_all(authors.into_iter().map(|id| async move {
            (id, self.profiles.display_name(id).await)
        }))
        .await
        .into_iter()
        .collect();

        let reviews = reviews
            .into_iter()
            .map(|review| {
                let author = names
                    .get(&review.user_id)
                    .cloned()
                    .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string());
                AuthoredReview { review, author }
            })
            .collect();

        Ok(ProductReviews { reviews, average })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use teeshop_core::{Profile, RatingError};

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::session::CurrentUser;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn reviews(backend: &Arc<MemoryBackend>, session: &SessionProvider) -> Reviews {
        let profiles = Arc::new(Profiles::new(backend.clone(), session.clone(), TIMEOUT));
        Reviews::new(backend.clone(), profiles, session.clone(), TIMEOUT)
    }

    #[tokio::test]
    async fn test_submit_requires_sign_in() {
        let backend = Arc::new(MemoryBackend::new());
        let reviews = reviews(&backend, &SessionProvider::signed_out());

        let err = reviews
            .submit(&ProductId::from("tshirt-001"), 5, None)
            .await
            .unwrap_err();
        assert!(err.requires_sign_in());
    }

    #[tokio::test]
    async fn test_submit_rejects_missing_rating() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_reviews(true);
        let session = SessionProvider::new(Some(CurrentUser::new(UserId::generate())));
        let reviews = reviews(&backend, &session);

        let err = reviews
            .submit(&ProductId::from("tshirt-001"), 0, Some("nice"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidRating(RatingError::Missing)));
        assert_eq!(err.user_message(), "Please select a rating");
    }

    #[tokio::test]
    async fn test_submit_and_list() {
        let backend = Arc::new(MemoryBackend::new());
        let author = UserId::generate();
        backend.put_profile(Profile {
            id: author,
            full_name: Some("Ada Lovelace".to_string()),
            avatar_url: None,
            updated_at: None,
        });
        let session = SessionProvider::new(Some(CurrentUser::new(author)));
        let reviews = reviews(&backend, &session);
        let tee = ProductId::from("tshirt-001");

        let stored = reviews.submit(&tee, 4, Some("  ")).await.unwrap();
        assert_eq!(stored.comment, None);

        session.sign_in(CurrentUser::new(UserId::generate()));
        reviews.submit(&tee, 5, Some("Great fit")).await.unwrap();
        reviews
            .submit(&ProductId::from("tshirt-002"), 1, None)
            .await
            .unwrap();

        let listing = reviews.list(&tee).await.unwrap();
        assert_eq!(listing.count(), 2);
        assert_eq!(listing.average, Some(4.5));
        assert_eq!(listing.reviews[0].author, ANONYMOUS_AUTHOR);
        assert_eq!(
            listing.reviews[0].review.comment.as_deref(),
            Some("Great fit")
        );
        assert_eq!(listing.reviews[1].author, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_list_without_reviews() {
        let backend = Arc::new(MemoryBackend::new());
        let reviews = reviews(&backend, &SessionProvider::signed_out());

        let listing = reviews.list(&ProductId::from("tshirt-008")).await.unwrap();
        assert_eq!(listing.count(), 0);
        assert_eq!(listing.average, None);
    }
}
