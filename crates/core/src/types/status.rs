//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Order lifecycle status as stored by the remote order store.
///
/// New orders are always created as [`OrderStatus::Pending`]; later
/// transitions happen outside the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    /// Any status string this build does not recognize.
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Position on the tracking progress bar (0 = placed, 3 = delivered).
    ///
    /// Returns `None` for cancelled orders. Unrecognized statuses are shown
    /// at the first step.
    #[must_use]
    pub const fn tracking_step(self) -> Option<u8> {
        match self {
            Self::Pending | Self::Unknown => Some(0),
            Self::Processing => Some(1),
            Self::Shipped => Some(2),
            Self::Delivered => Some(3),
            Self::Cancelled => None,
        }
    }

    /// Returns the status as its wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = std::convert::Infallible;

    /// Case-insensitive; unrecognized strings map to [`OrderStatus::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "shipped" => Self::Shipped,
            "delivered" => Self::Delivered,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown,
        })
    }
}
