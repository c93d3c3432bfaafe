//! Services over the remote store that keep no state of their own.
//!
//! - [`OrderHistory`] - Past orders of the signed-in user
//! - [`Reviews`] - Product review submission and listing
//! - [`Profiles`] - Profile lookups (cached) and name edits

pub mod orders;
pub mod profile;
pub mod reviews;

pub use orders::OrderHistory;
pub use profile::{ANONYMOUS_AUTHOR, Profiles};
pub use reviews::{AuthoredReview, ProductReviews, Reviews};
