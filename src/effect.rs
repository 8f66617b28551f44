//! Deferred, cancellable units of side-effecting work.
//!
//! An [`Effect`] is a value describing async work that will eventually emit
//! zero or more outputs. Constructing one runs nothing; the work starts only
//! when a store subscribes it. Effects never fail: a fallible operation must
//! map its `Result` into an output value (typically an action variant) before
//! it reaches the runtime.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, Stream, StreamExt};

/// Opaque key identifying a cancellable effect.
///
/// Subscribing an effect tagged with an id cancels any live effect already
/// registered under the same id in the store's [`CancelScope`]
/// (restart-on-id semantics).
///
/// [`CancelScope`]: crate::CancelScope
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CancelId(Cow<'static, str>);

impl From<&'static str> for CancelId {
    fn from(id: &'static str) -> Self {
        CancelId(Cow::Borrowed(id))
    }
}

impl From<String> for CancelId {
    fn from(id: String) -> Self {
        CancelId(Cow::Owned(id))
    }
}

impl fmt::Display for CancelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A lazily-started async computation producing `Output` values.
///
/// Four shapes share this one type, so heterogeneous effects can be returned
/// in a single `Vec<Effect<Action>>` from a reducer:
///
/// - [`Effect::sync`]: one synchronously computed output
/// - [`Effect::fire_and_forget`]: side effect only, no output
/// - [`Effect::future`]: one asynchronously computed output
/// - [`Effect::stream`]: zero or more outputs over time
///
/// An effect that is never subscribed never executes its work.
pub struct Effect<Output> {
    pub(crate) kind: EffectKind<Output>,
    pub(crate) cancel_id: Option<CancelId>,
}

pub(crate) enum EffectKind<Output> {
    Sync(Box<dyn FnOnce() -> Output + Send>),
    FireAndForget(Box<dyn FnOnce() + Send>),
    Future(BoxFuture<'static, Output>),
    Stream(BoxStream<'static, Output>),
}

impl<Output: Send + 'static> Effect<Output> {
    /// An effect that, once subscribed, runs `work` synchronously on the
    /// dispatch path and emits its return value as the single output.
    pub fn sync<F>(work: F) -> Self
    where
        F: FnOnce() -> Output + Send + 'static,
    {
        Effect {
            kind: EffectKind::Sync(Box::new(work)),
            cancel_id: None,
        }
    }

    /// An effect that runs `work` for its side effect only. Emits nothing
    /// and completes immediately.
    pub fn fire_and_forget<F>(work: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Effect {
            kind: EffectKind::FireAndForget(Box::new(work)),
            cancel_id: None,
        }
    }

    /// An effect that spawns `fut` on the ambient tokio runtime and emits its
    /// single output. The future is not polled until subscription.
    pub fn future<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Output> + Send + 'static,
    {
        Effect {
            kind: EffectKind::Future(fut.boxed()),
            cancel_id: None,
        }
    }

    /// An effect that spawns `stream` on the ambient tokio runtime and emits
    /// each item until the stream ends. The erasure point for arbitrary async
    /// sources such as timers or channels.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Output> + Send + 'static,
    {
        Effect {
            kind: EffectKind::Stream(stream.boxed()),
            cancel_id: None,
        }
    }

    /// Transform every output with `f`. The effect's shape, laziness, and
    /// cancellation tag are untouched.
    pub fn map<T, F>(self, f: F) -> Effect<T>
    where
        T: Send + 'static,
        F: FnMut(Output) -> T + Send + 'static,
    {
        let mut f = f;
        let kind = match self.kind {
            EffectKind::Sync(work) => EffectKind::Sync(Box::new(move || f(work()))),
            EffectKind::FireAndForget(work) => EffectKind::FireAndForget(work),
            EffectKind::Future(fut) => EffectKind::Future(fut.map(move |out| f(out)).boxed()),
            EffectKind::Stream(stream) => EffectKind::Stream(stream.map(f).boxed()),
        };
        Effect {
            kind,
            cancel_id: self.cancel_id,
        }
    }

    /// Tag the effect with a cancellation id. Subscribing it cancels any
    /// live same-id effect first, then registers this one in its place, so
    /// only the latest effect under an id ever delivers output.
    pub fn cancellable(mut self, id: impl Into<CancelId>) -> Self {
        self.cancel_id = Some(id.into());
        self
    }

    pub(crate) fn into_parts(self) -> (EffectKind<Output>, Option<CancelId>) {
        (self.kind, self.cancel_id)
    }
}
