//! Star rating for product reviews.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// No star was selected.
    #[error("please select a rating")]
    Missing,
    /// The value is above the top of the scale.
    #[error("rating must be between {min} and {max} (got {got})")]
    OutOfRange {
        /// Lowest allowed value.
        min: u8,
        /// Highest allowed value.
        max: u8,
        /// The rejected value.
        got: u8,
    },
}

/// A one-to-five star rating.
///
/// ## Examples
///
/// ```
/// use teeshop_core::Rating;
///
/// assert!(Rating::new(4).is_ok());
/// assert!(Rating::new(0).is_err()); // nothing selected
/// assert!(Rating::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest rating on the scale.
    pub const MIN: u8 = 1;
    /// Highest rating on the scale.
    pub const MAX: u8 = 5;

    /// Validate a rating value.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::Missing`] for zero and
    /// [`RatingError::OutOfRange`] for values above [`Rating::MAX`].
    pub const fn new(value: u8) -> Result<Self, RatingError> {
        if value == 0 {
            return Err(RatingError::Missing);
        }
        if value > Self::MAX {
            return Err(RatingError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                got: value,
            });
        }
        Ok(Self(value))
    }

    /// Get the number of stars.
    #[must_use]
    pub const fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_missing() {
        assert_eq!(Rating::new(0), Err(RatingError::Missing));
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            Rating::new(9),
            Err(RatingError::OutOfRange { got: 9, .. })
        ));
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        assert!(serde_json::from_str::<Rating>("3").is_ok());
        assert!(serde_json::from_str::<Rating>("7").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rating::new(4).unwrap().to_string(), "4/5");
    }
}
