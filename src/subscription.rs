//! Explicit observer subscriptions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Handle to an observer registration on a store or view store.
///
/// Notifications stop as soon as the handle is released, either explicitly
/// via [`Subscription::cancel`] or by dropping it. Teardown is deterministic:
/// release happens on this call path, never on a later garbage-collection
/// pass.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    active: Arc<AtomicBool>,
}

impl Subscription {
    pub(crate) fn new(active: Arc<AtomicBool>) -> Self {
        Subscription { active }
    }

    /// Release the subscription; the observer receives no further values.
    pub fn cancel(self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

pub(crate) struct ObserverEntry<T> {
    active: Arc<AtomicBool>,
    callback: Box<dyn FnMut(&T) + Send>,
}

/// List of observer callbacks notified on each committed value.
pub(crate) struct ObserverList<T> {
    entries: Mutex<Vec<ObserverEntry<T>>>,
}

impl<T> ObserverList<T> {
    pub(crate) fn new() -> Self {
        ObserverList {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn push(&self, callback: Box<dyn FnMut(&T) + Send>) -> Subscription {
        let active = Arc::new(AtomicBool::new(true));
        self.entries.lock().push(ObserverEntry {
            active: Arc::clone(&active),
            callback,
        });
        Subscription::new(active)
    }

    /// Invoke every live callback with `value`, purging released entries.
    ///
    /// The list is taken out of its lock for the duration of the callbacks,
    /// so an observer that re-enters `send` enqueues work instead of
    /// deadlocking on this lock. Observers registered mid-notification are
    /// merged back in and see the next value.
    pub(crate) fn notify(&self, value: &T) {
        let mut entries = std::mem::take(&mut *self.entries.lock());
        entries.retain_mut(|entry| {
            if entry.active.load(Ordering::Acquire) {
                (entry.callback)(value);
                true
            } else {
                false
            }
        });
        let mut slot = self.entries.lock();
        entries.append(&mut slot);
        *slot = entries;
    }
}
