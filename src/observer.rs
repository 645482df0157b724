//! Publish/subscribe registry shared by the match and the AI actor.
//!
//! A [`Subject`] keeps its observers in registration order and hands out a
//! [`SubscriptionId`] per registration. Notification works on a snapshot of
//! the list, so observers added or removed during a pass only affect the
//! next one.

use std::sync::{Arc, Mutex};

use tracing::{debug, instrument, trace};

/// Receives events from a [`Subject`].
pub trait Observer<E>: Send + Sync {
    /// Called once per published event.
    fn update(&self, event: &E);
}

impl<E, F> Observer<E> for F
where
    F: Fn(&E) + Send + Sync,
{
    fn update(&self, event: &E) {
        self(event)
    }
}

/// Handle identifying one registration on a [`Subject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}

struct Registration<E> {
    id: SubscriptionId,
    observer: Arc<dyn Observer<E>>,
}

struct Registrations<E> {
    next_id: u64,
    entries: Vec<Registration<E>>,
}

/// Ordered list of observers for events of type `E`.
///
/// Registering the same observer twice yields two subscriptions and two
/// notifications per event.
pub struct Subject<E> {
    registrations: Mutex<Registrations<E>>,
}

impl<E> Subject<E> {
    /// Creates a subject with no observers.
    pub fn new() -> Self {
        Self {
            registrations: Mutex::new(Registrations {
                next_id: 0,
                entries: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registrations<E>> {
        self.registrations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds an observer at the end of the notification order.
    #[instrument(skip_all)]
    pub fn register(&self, observer: Arc<dyn Observer<E>>) -> SubscriptionId {
        let mut registrations = self.lock();
        let id = SubscriptionId(registrations.next_id);
        registrations.next_id += 1;
        registrations.entries.push(Registration { id, observer });
        debug!(%id, count = registrations.entries.len(), "Observer registered");
        id
    }

    /// Removes a registration. Unknown or already removed IDs are ignored.
    ///
    /// Returns `true` if a registration was removed.
    #[instrument(skip(self))]
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut registrations = self.lock();
        let before = registrations.entries.len();
        registrations.entries.retain(|entry| entry.id != id);
        let removed = registrations.entries.len() != before;
        debug!(removed, "Observer removal requested");
        removed
    }

    /// Removes the first registration of this exact observer instance.
    ///
    /// Returns `true` if a registration was removed.
    #[instrument(skip_all)]
    pub fn remove_observer(&self, observer: &Arc<dyn Observer<E>>) -> bool {
        let target = Arc::as_ptr(observer) as *const ();
        let mut registrations = self.lock();
        let position = registrations
            .entries
            .iter()
            .position(|entry| Arc::as_ptr(&entry.observer) as *const () == target);

        match position {
            Some(index) => {
                let entry = registrations.entries.remove(index);
                debug!(id = %entry.id, "Observer removed by reference");
                true
            }
            None => false,
        }
    }

    /// Delivers `event` to every observer in registration order.
    ///
    /// Returns the number of observers notified.
    pub fn notify(&self, event: &E) -> usize {
        let snapshot: Vec<Arc<dyn Observer<E>>> = self
            .lock()
            .entries
            .iter()
            .map(|entry| Arc::clone(&entry.observer))
            .collect();

        trace!(count = snapshot.len(), "Notifying observers");
        for observer in &snapshot {
            observer.update(event);
        }
        snapshot.len()
    }

    /// Number of active registrations.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for Subject<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Subject<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("observers", &self.len())
            .finish()
    }
}
