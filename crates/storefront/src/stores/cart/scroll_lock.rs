//! Background scroll lock.
//!
//! While the cart panel is open the page behind it must not scroll. The lock
//! is a counted resource: each holder owns a guard, and scrolling resumes
//! once every guard has been dropped. Dropping the guard is the only way to
//! release it, so a panel torn down without an explicit close still
//! releases its hold.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared handle to the page's scroll lock.
#[derive(Debug, Clone, Default)]
pub struct ScrollLock {
    holders: Arc<AtomicUsize>,
}

impl ScrollLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspend background scrolling until the guard is dropped.
    #[must_use = "scrolling resumes as soon as the guard is dropped"]
    pub fn acquire(&self) -> ScrollLockGuard {
        if self.holders.fetch_add(1, Ordering::AcqRel) == 0 {
            tracing::debug!("Background scroll suspended");
        }
        ScrollLockGuard {
            holders: Arc::clone(&self.holders),
        }
    }

    /// Whether background scrolling is currently suspended.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.holders.load(Ordering::Acquire) > 0
    }
}

/// Releases its hold on the scroll lock when dropped.
#[derive(Debug)]
pub struct ScrollLockGuard {
    holders: Arc<AtomicUsize>,
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        if self.holders.fetch_sub(1, Ordering::AcqRel) == 1 {
            tracing::debug!("Background scroll resumed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_released_when_last_guard_drops() {
        let lock = ScrollLock::new();
        assert!(!lock.is_locked());

        let first = lock.acquire();
        let second = lock.clone().acquire();
        assert!(lock.is_locked());

        drop(first);
        assert!(lock.is_locked());
        drop(second);
        assert!(!lock.is_locked());
    }
}
