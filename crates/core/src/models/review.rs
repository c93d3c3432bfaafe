//! Product review records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, Rating, ReviewId, UserId};

/// Insert payload for the `product_reviews` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub rating: Rating,
    pub comment: Option<String>,
}

/// A submitted review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub rating: Rating,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Mean star rating, or `None` when there are no reviews.
#[must_use]
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating.stars())).sum();
    #[allow(clippy::cast_precision_loss)] // Review counts never approach f64 precision limits
    let count = reviews.len() as f64;
    Some(f64::from(total) / count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn review(stars: u8) -> Review {
        Review {
            id: ReviewId::generate(),
            user_id: UserId::generate(),
            product_id: ProductId::from("tshirt-001"),
            rating: Rating::new(stars).unwrap(),
            comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_average_of_none() {
        assert_eq!(average_rating(&[]), None);
    }

    #[test]
    fn test_average() {
        let avg = average_rating(&[review(5), review(4), review(3)]).unwrap();
        assert!((avg - 4.0).abs() < f64::EPSILON);
    }
}
