//! The store: single owner of application state and the dispatch loop.
//!
//! All mutation funnels through [`Store::send`]. Dispatch is an explicit
//! FIFO work queue rather than recursion: effect outputs re-enter as queued
//! actions, so arbitrarily long action chains never grow the call stack, and
//! ordering is observable. Whichever context holds the drain processes every
//! queued action; all other contexts (including effect tasks delivering
//! outputs) enqueue and return.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::task::AbortHandle;

use crate::cancellation::CancelScope;
use crate::effect::{CancelId, Effect, EffectKind};
use crate::subscription::{ObserverList, Subscription};

/// Coordinator owning the single authoritative state value.
///
/// The reducer and environment are fixed at construction. [`Store::send`] is
/// the only mutation path; observers derived with [`Store::view`] and
/// children derived with [`Store::scope`] are read/write projections, never
/// second sources of truth.
///
/// Concurrent `send` calls from independent contexts are serialized through
/// the pending queue, but the design assumes a single coordinating context;
/// effect outputs are marshaled back onto the dispatch path automatically.
pub struct Store<State, Action> {
    pub(crate) core: Arc<StoreCore<State, Action>>,
    /// Parent commit link for stores derived via [`Store::scope`].
    pub(crate) parent_link: Option<Subscription>,
}

pub(crate) struct StoreCore<State, Action> {
    state: Mutex<State>,
    reducer: Box<dyn Fn(&mut State, Action) -> Vec<Effect<Action>> + Send + Sync>,
    queue: Mutex<VecDeque<Action>>,
    draining: AtomicBool,
    observers: ObserverList<State>,
    scope: Arc<CancelScope>,
    /// Live async effect tasks, keyed by subscription seq.
    live: Mutex<HashMap<u64, AbortHandle>>,
    next_seq: AtomicU64,
}

impl<State, Action> Store<State, Action>
where
    State: Clone + Send + 'static,
    Action: Send + 'static,
{
    /// Build a store from an initial state, a reducer, and the environment
    /// of dependencies the reducer needs. The store owns a fresh
    /// [`CancelScope`].
    ///
    /// The environment stays a concrete generic type, closed over here; no
    /// runtime type checks are involved.
    pub fn new<Env, R>(initial: State, reducer: R, environment: Env) -> Self
    where
        Env: Send + Sync + 'static,
        R: Fn(&mut State, Action, &Env) -> Vec<Effect<Action>> + Send + Sync + 'static,
    {
        Self::with_scope(initial, reducer, environment, Arc::new(CancelScope::new()))
    }

    /// Like [`Store::new`], but cancellation keys register in `scope` so
    /// cooperating stores can supersede each other's effects.
    pub fn with_scope<Env, R>(
        initial: State,
        reducer: R,
        environment: Env,
        scope: Arc<CancelScope>,
    ) -> Self
    where
        Env: Send + Sync + 'static,
        R: Fn(&mut State, Action, &Env) -> Vec<Effect<Action>> + Send + Sync + 'static,
    {
        Store {
            core: Arc::new(StoreCore {
                state: Mutex::new(initial),
                reducer: Box::new(move |state, action| reducer(state, action, &environment)),
                queue: Mutex::new(VecDeque::new()),
                draining: AtomicBool::new(false),
                observers: ObserverList::new(),
                scope,
                live: Mutex::new(HashMap::new()),
                next_seq: AtomicU64::new(0),
            }),
            parent_link: None,
        }
    }

    /// Dispatch an action. Fire-and-forget: the reducer runs and the new
    /// state is committed and published to observers, then every returned
    /// effect is subscribed; effect outputs feed back in as further actions.
    ///
    /// An action no reducer recognizes commits an unchanged state and
    /// schedules nothing; that is not an error.
    pub fn send(&self, action: Action) {
        StoreCore::dispatch(&self.core, action);
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> State {
        self.core.state.lock().clone()
    }

    /// For a store derived with [`Store::scope`]: release the link through
    /// which parent commits propagate down. The child keeps working as a
    /// write-through projection but no longer observes parent-side changes.
    /// No-op on a root store.
    pub fn detach(&mut self) {
        if let Some(link) = self.parent_link.take() {
            link.cancel();
        }
    }
}

impl<State, Action> StoreCore<State, Action>
where
    State: Clone + Send + 'static,
    Action: Send + 'static,
{
    pub(crate) fn dispatch(self: &Arc<Self>, action: Action) {
        self.queue.lock().push_back(action);
        if self.draining.swap(true, Ordering::AcqRel) {
            // Another context holds the drain; it will pick this action up.
            return;
        }
        loop {
            loop {
                let next = self.queue.lock().pop_front();
                match next {
                    Some(action) => self.step(action),
                    None => break,
                }
            }
            self.draining.store(false, Ordering::Release);
            // An enqueue may have raced the flag release; reclaim the drain
            // unless the queue is empty or someone else already has it.
            if self.queue.lock().is_empty() || self.draining.swap(true, Ordering::AcqRel) {
                break;
            }
        }
    }

    fn step(self: &Arc<Self>, action: Action) {
        let (committed, effects) = {
            let mut state = self.state.lock();
            let effects = (self.reducer)(&mut state, action);
            (state.clone(), effects)
        };
        self.observers.notify(&committed);
        for effect in effects {
            self.subscribe(effect);
        }
    }

    fn subscribe(self: &Arc<Self>, effect: Effect<Action>) {
        let (kind, cancel_id) = effect.into_parts();
        if let Some(id) = &cancel_id {
            self.scope.supersede(id);
        }
        match kind {
            EffectKind::FireAndForget(work) => work(),
            EffectKind::Sync(work) => self.queue.lock().push_back(work()),
            EffectKind::Future(fut) => self.spawn(cancel_id, futures::stream::once(fut).boxed()),
            EffectKind::Stream(stream) => self.spawn(cancel_id, stream),
        }
    }

    /// Spawn an async effect subscription, forwarding each output back into
    /// the dispatch queue. Requires an ambient tokio runtime.
    fn spawn(self: &Arc<Self>, cancel_id: Option<CancelId>, mut stream: BoxStream<'static, Action>) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let weak = Arc::downgrade(self);
        let cleanup_weak = Arc::downgrade(self);
        let cleanup_scope = Arc::clone(&self.scope);
        let cleanup_id = cancel_id.clone();
        // Hold the task until it is registered, so completion bookkeeping
        // can never run before registration exists.
        let (registered_tx, registered_rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            // Runs on normal completion and, because aborting drops the
            // future, on cancellation too.
            let _cleanup = scopeguard::guard((), move |_| {
                if let Some(id) = &cleanup_id {
                    cleanup_scope.complete(id, seq);
                }
                if let Some(core) = cleanup_weak.upgrade() {
                    core.live.lock().remove(&seq);
                }
            });
            let _ = registered_rx.await;
            while let Some(output) = stream.next().await {
                // A dropped store discards late outputs.
                let Some(core) = weak.upgrade() else { break };
                StoreCore::dispatch(&core, output);
            }
        });

        self.live.lock().insert(seq, handle.abort_handle());
        if let Some(id) = cancel_id {
            self.scope.register(id, seq, handle.abort_handle());
        }
        let _ = registered_tx.send(());
    }

    pub(crate) fn observe(&self, callback: Box<dyn FnMut(&State) + Send>) -> Subscription {
        self.observers.push(callback)
    }

    pub(crate) fn current(&self) -> State {
        self.state.lock().clone()
    }

    /// Commit a value pushed down from a parent store and republish it.
    ///
    /// Used only by scoped children. If this child is mid-dispatch (its own
    /// reducer holds the state lock and will refresh from the parent
    /// itself), the push-down is skipped rather than deadlocking.
    pub(crate) fn commit_projected(&self, state: State) {
        {
            let Some(mut slot) = self.state.try_lock() else {
                return;
            };
            *slot = state.clone();
        }
        self.observers.notify(&state);
    }
}

impl<State, Action> Drop for StoreCore<State, Action> {
    fn drop(&mut self) {
        let live = std::mem::take(&mut *self.live.lock());
        if !live.is_empty() {
            tracing::debug!(count = live.len(), "aborting live effects on store teardown");
        }
        for (_, abort) in live {
            abort.abort();
        }
    }
}
