//! Locale-changed notifications.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::util::lock;

/// Payload delivered to subscribers after a locale switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleChanged {
    /// Locale that is active after the switch.
    pub language: String,
}

/// Subscriber callback.
type Callback = Arc<dyn Fn(&LocaleChanged) + Send + Sync>;

/// Handle returned by [`Observers::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
}

/// Registry of locale-changed subscribers.
#[derive(Default)]
pub struct Observers {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Callback)>>,
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl Observers {
    /// Register `callback`; it runs after every completed locale switch.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&LocaleChanged) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.entries).push((id, Arc::new(callback)));
        Subscription { id }
    }

    /// Remove a subscriber. Returns `false` if it was already removed.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|(id, _)| *id != subscription.id);
        entries.len() != before
    }

    /// What: Deliver `event` to every subscriber in registration order.
    ///
    /// Details:
    /// - Callbacks run outside the registry lock, so they may subscribe or
    ///   unsubscribe without deadlocking.
    pub fn notify(&self, event: &LocaleChanged) {
        let callbacks: Vec<Callback> = lock(&self.entries)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        tracing::debug!(
            language = %event.language,
            subscribers = callbacks.len(),
            "broadcasting locale change"
        );
        for callback in callbacks {
            callback(event);
        }
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// True when nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
