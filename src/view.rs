//! Observable projections of a store.
//!
//! A [`ViewStore`] is a read-only, duplicate-suppressed observer of a store's
//! value plus a `send` entry point; [`Store::scope`] derives a child store
//! restricted to a sub-state/sub-action. Neither mutates state on its own;
//! every write funnels back into the root store's reducer.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::store::{Store, StoreCore};
use crate::subscription::{ObserverList, Subscription};

/// Duplicate-suppressing observer of a (projected) store value.
///
/// Holds a cached last-seen value; parent commits replace it and are
/// republished to this view store's own observers only when the duplicate
/// predicate reports the values as distinct. Once the upstream subscription
/// is released (the view store is dropped), the cached value goes inert.
pub struct ViewStore<Value, Action> {
    inner: Arc<ViewInner<Value>>,
    send_fn: Arc<dyn Fn(Action) + Send + Sync>,
    _upstream: Subscription,
}

struct ViewInner<Value> {
    value: Mutex<Value>,
    observers: ObserverList<Value>,
}

impl<State, Action> Store<State, Action>
where
    State: Clone + Send + 'static,
    Action: Send + 'static,
{
    /// Derive a [`ViewStore`] that republishes a committed state only when
    /// `is_duplicate(previous, new)` is false.
    pub fn view_with(
        &self,
        is_duplicate: impl Fn(&State, &State) -> bool + Send + 'static,
    ) -> ViewStore<State, Action> {
        let inner = Arc::new(ViewInner {
            value: Mutex::new(self.core.current()),
            observers: ObserverList::new(),
        });

        let weak = Arc::downgrade(&inner);
        let upstream = self.core.observe(Box::new(move |new: &State| {
            let Some(inner) = weak.upgrade() else { return };
            let changed = {
                let mut current = inner.value.lock();
                if is_duplicate(&current, new) {
                    false
                } else {
                    *current = new.clone();
                    true
                }
            };
            if changed {
                inner.observers.notify(new);
            }
        }));

        let core = Arc::clone(&self.core);
        ViewStore {
            inner,
            send_fn: Arc::new(move |action| StoreCore::dispatch(&core, action)),
            _upstream: upstream,
        }
    }

    /// [`Store::view_with`] using `==` as the duplicate predicate.
    pub fn view(&self) -> ViewStore<State, Action>
    where
        State: PartialEq,
    {
        self.view_with(|previous, new| previous == new)
    }

    /// Derive a child store for a sub-state/sub-action.
    ///
    /// Reads project the parent value through `to_local`; every child `send`
    /// funnels through `to_global` into the parent's dispatch and then
    /// refreshes the child value from the parent's new state. Parent commits
    /// propagate down for as long as the child lives. The child never
    /// mutates state independently.
    pub fn scope<LocalState, LocalAction>(
        &self,
        to_local: impl Fn(&State) -> LocalState + Send + Sync + 'static,
        to_global: impl Fn(LocalAction) -> Action + Send + Sync + 'static,
    ) -> Store<LocalState, LocalAction>
    where
        LocalState: Clone + Send + 'static,
        LocalAction: Send + 'static,
    {
        let to_local = Arc::new(to_local);
        let parent = Arc::clone(&self.core);
        let project = Arc::clone(&to_local);
        let mut child = Store::new(
            (*to_local)(&self.core.current()),
            move |local_state: &mut LocalState, local_action: LocalAction, _env: &()| {
                StoreCore::dispatch(&parent, to_global(local_action));
                *local_state = (*project)(&parent.current());
                Vec::new()
            },
            (),
        );

        let weak_child = Arc::downgrade(&child.core);
        let project_down = Arc::clone(&to_local);
        child.parent_link = Some(self.core.observe(Box::new(move |new: &State| {
            if let Some(core) = weak_child.upgrade() {
                core.commit_projected((*project_down)(new));
            }
        })));
        child
    }
}

impl<Value, Action> ViewStore<Value, Action>
where
    Value: Clone + Send + 'static,
    Action: Send + 'static,
{
    /// Clone of the cached last-seen value.
    pub fn value(&self) -> Value {
        self.inner.value.lock().clone()
    }

    /// Dispatch an action to the underlying store.
    pub fn send(&self, action: Action) {
        (*self.send_fn)(action);
    }

    /// Register an observer of republished values. Release the returned
    /// [`Subscription`] (or drop it) to stop notifications.
    pub fn observe(&self, callback: impl FnMut(&Value) + Send + 'static) -> Subscription {
        self.inner.observers.push(Box::new(callback))
    }

    /// Derive a view store for a projected sub-value and sub-action, with
    /// its own duplicate suppression on the projected value.
    pub fn scope<LocalValue, LocalAction>(
        &self,
        to_local: impl Fn(&Value) -> LocalValue + Send + 'static,
        to_global: impl Fn(LocalAction) -> Action + Send + Sync + 'static,
        is_duplicate: impl Fn(&LocalValue, &LocalValue) -> bool + Send + 'static,
    ) -> ViewStore<LocalValue, LocalAction>
    where
        LocalValue: Clone + Send + 'static,
        LocalAction: 'static,
    {
        let inner = Arc::new(ViewInner {
            value: Mutex::new(to_local(&self.value())),
            observers: ObserverList::new(),
        });

        let weak = Arc::downgrade(&inner);
        let upstream = self.inner.observers.push(Box::new(move |value: &Value| {
            let Some(inner) = weak.upgrade() else { return };
            let local = to_local(value);
            let changed = {
                let mut current = inner.value.lock();
                if is_duplicate(&current, &local) {
                    false
                } else {
                    *current = local.clone();
                    true
                }
            };
            if changed {
                inner.observers.notify(&local);
            }
        }));

        let parent_send = Arc::clone(&self.send_fn);
        ViewStore {
            inner,
            send_fn: Arc::new(move |local| (*parent_send)(to_global(local))),
            _upstream: upstream,
        }
    }
}
