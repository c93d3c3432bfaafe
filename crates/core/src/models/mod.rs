//! Records exchanged with the remote data store.
//!
//! `New*` types are insert payloads; the others are rows as returned by the
//! store, including server-assigned IDs and timestamps. Field names match the
//! remote column names so the types serialize directly onto the wire.

pub mod order;
pub mod profile;
pub mod review;
pub mod wishlist;

pub use order::{NewOrder, NewOrderLine, Order, OrderLine, OrderWithLines};
pub use profile::Profile;
pub use review::{NewReview, Review, average_rating};
pub use wishlist::{NewWishlistEntry, WishlistEntry};
