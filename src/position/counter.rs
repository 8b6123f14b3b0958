//! Single-writer position indicator shared between a reader and observers.

#[cfg(not(loom))]
use std::sync::atomic::{AtomicI64, Ordering};

#[cfg(loom)]
use loom::sync::atomic::{AtomicI64, Ordering};

/// Exposed position counter owned by a subscriber.
///
/// Exactly one reader writes the counter with release ordering; any number of
/// threads may read it with acquire ordering to observe lag or drive flow
/// control. A published value is never torn.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use termframe::position::SubscriberPosition;
///
/// let position = Arc::new(SubscriberPosition::new(7, 0));
/// position.set_ordered(4096);
/// assert_eq!(position.get(), 4096);
/// assert_eq!(position.id(), 7);
/// ```
#[derive(Debug)]
pub struct SubscriberPosition {
    id: i32,
    value: AtomicI64,
}

impl SubscriberPosition {
    /// Create a counter identified by `id` holding `initial`.
    #[must_use]
    pub fn new(id: i32, initial: i64) -> Self {
        Self {
            id,
            value: AtomicI64::new(initial),
        }
    }

    /// Identifier of the counter within its owner.
    #[must_use]
    pub fn id(&self) -> i32 { self.id }

    /// Read the most recently published position.
    #[must_use]
    pub fn get(&self) -> i64 { self.value.load(Ordering::Acquire) }

    /// Publish `position` to observers.
    pub fn set_ordered(&self, position: i64) { self.value.store(position, Ordering::Release); }
}
