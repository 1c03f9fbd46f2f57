//! State Cell Implementation
//!
//! A State is the unit of reactivity. It holds a single value and a list of
//! subscribers that are told, synchronously and in subscription order, when
//! that value changes.
//!
//! # How State Cells Work
//!
//! 1. Application code creates its cells when the app is constructed and
//!    keeps them for the lifetime of the app.
//!
//! 2. Event handlers call `set` or `update`. A write that leaves the value
//!    equal (by `PartialEq`) to the current one is dropped without
//!    notification, so handlers can write unconditionally without causing
//!    re-render storms.
//!
//! 3. The application host subscribes to every cell and re-renders when any
//!    of them reports a change.
//!
//! # Thread Safety
//!
//! The value sits behind a `parking_lot::RwLock`. Neither lock is held while
//! subscribers run, so a subscriber may read the cell it was notified by.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::subscriber::{Subscriber, SubscriberId};

/// Process-unique identifier of a state cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u64);

impl StateId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A reactive state cell holding a value of type `T`.
///
/// Cloning a `State` yields another handle to the same cell, which is how
/// event handler closures capture it.
///
/// # Example
///
/// ```rust
/// use trellis_core::reactive::State;
///
/// let count = State::new(0);
/// count.update(|c| c + 1);
/// assert_eq!(count.get(), 1);
/// ```
pub struct State<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    id: StateId,
    value: Arc<RwLock<T>>,
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
}

impl<T> State<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a new cell with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            id: StateId::next(),
            value: Arc::new(RwLock::new(value)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get the cell's unique ID.
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Get a copy of the current value. Has no side effects.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Read the current value through a closure without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.read())
    }

    /// Store a new value and notify subscribers if it differs from the
    /// current one.
    ///
    /// Returns `true` when the value changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut guard = self.value.write();
            if *guard == value {
                return false;
            }
            *guard = value;
        }

        self.notify_subscribers();
        true
    }

    /// Replace the value with `f(current)`.
    ///
    /// Same notification rules as [`State::set`].
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = f(&self.value.read());
        self.set(new_value)
    }

    /// Register a callback that runs after every effective change.
    pub fn subscribe<F>(&self, notify: F) -> SubscriberId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.push_subscriber(Subscriber::new(notify))
    }

    /// Remove a subscriber.
    pub fn unsubscribe(&self, subscriber_id: SubscriberId) {
        self.subscribers
            .write()
            .retain(|subscriber| subscriber.id() != subscriber_id);
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    fn push_subscriber(&self, subscriber: Subscriber) -> SubscriberId {
        let id = subscriber.id();
        self.subscribers.write().push(subscriber);
        id
    }

    fn notify_subscribers(&self) {
        // Snapshot so a subscriber can subscribe or unsubscribe without
        // deadlocking on the list.
        let subscribers = self.subscribers.read().clone();
        for subscriber in &subscribers {
            subscriber.notify();
        }
    }
}

impl<T> Clone for State<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T> Debug for State<T>
where
    T: Clone + PartialEq + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("value", &*self.value.read())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Type-erased view of a state cell.
///
/// Lets the application host subscribe to cells of different value types
/// through one list.
pub trait Observable: Send + Sync {
    /// ID of the underlying cell.
    fn state_id(&self) -> StateId;

    /// Register a change callback.
    fn observe(&self, notify: Box<dyn Fn() + Send + Sync>) -> SubscriberId;
}

impl<T> Observable for State<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn state_id(&self) -> StateId {
        self.id
    }

    fn observe(&self, notify: Box<dyn Fn() + Send + Sync>) -> SubscriberId {
        self.push_subscriber(Subscriber::from_boxed(notify))
    }
}
