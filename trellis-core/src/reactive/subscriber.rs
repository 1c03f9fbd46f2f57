//! Subscriber types for the reactive system.
//!
//! A Subscriber is a callback registered on a state cell. The application
//! host registers one per cell so it can tell when an event handler changed
//! anything.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Unique identifier for a subscriber.
///
/// Each registration gets a fresh ID, which is what `unsubscribe` takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// A subscriber to a state cell.
///
/// Cloning is cheap; clones share the same callback and ID.
#[derive(Clone)]
pub struct Subscriber {
    id: SubscriberId,
    notify: Arc<dyn Fn() + Send + Sync>,
}

impl Subscriber {
    /// Create a new subscriber with the given notification callback.
    pub fn new<F>(notify: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            id: SubscriberId::new(),
            notify: Arc::new(notify),
        }
    }

    pub(crate) fn from_boxed(notify: Box<dyn Fn() + Send + Sync>) -> Self {
        Self {
            id: SubscriberId::new(),
            notify: Arc::from(notify),
        }
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Notify the subscriber that the cell it watches changed.
    pub fn notify(&self) {
        (self.notify)();
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}
