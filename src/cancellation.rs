//! Keyed registry of in-flight effect subscriptions.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::task::AbortHandle;

use crate::effect::CancelId;

/// Registry mapping a [`CancelId`] to the one live effect subscription
/// allowed under that id.
///
/// Every [`Store`] owns a scope of its own by default, so independent
/// runtimes in one process never cross-cancel. Inject a shared scope with
/// [`Store::with_scope`] when cooperating stores should be able to supersede
/// each other's effects.
///
/// [`Store`]: crate::Store
/// [`Store::with_scope`]: crate::Store::with_scope
#[derive(Default)]
pub struct CancelScope {
    live: Mutex<HashMap<CancelId, Entry>>,
}

struct Entry {
    /// Monotonic per-subscription token. Completion removes an entry only if
    /// the token still matches, so a slow effect finishing late can never
    /// evict the registration that superseded it.
    seq: u64,
    abort: AbortHandle,
}

impl CancelScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel and remove the live subscription under `id`, if any.
    pub(crate) fn supersede(&self, id: &CancelId) {
        if let Some(entry) = self.live.lock().remove(id) {
            tracing::debug!(cancel_id = %id, "superseding in-flight effect");
            entry.abort.abort();
        }
    }

    /// Register a freshly spawned subscription under `id`.
    pub(crate) fn register(&self, id: CancelId, seq: u64, abort: AbortHandle) {
        self.live.lock().insert(id, Entry { seq, abort });
    }

    /// Remove the entry for `id` once its subscription completes, unless a
    /// newer subscription has already replaced it.
    pub(crate) fn complete(&self, id: &CancelId, seq: u64) {
        let mut live = self.live.lock();
        if live.get(id).is_some_and(|entry| entry.seq == seq) {
            live.remove(id);
        }
    }
}
