//! Unidirectional state-management runtime.
//!
//! An application describes its entire state as one value and its state
//! transitions as pure reducers; side effects run as cancellable async
//! computations. A [`Store`] is the single place mutation happens and
//! effects are dispatched.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ Reducer ──→ State ──→ ViewStore observers
//!    ↑           │
//!    │           ▼
//!    └──────── Effects (lazy, async, cancellable)
//! ```
//!
//! - **State**: single authoritative value, owned by the [`Store`]
//! - **Action**: events from the outside world or from effect outputs
//! - **Reducer**: pure transition `(state, action, env) -> effects`
//! - **Effect**: lazily-started async work whose outputs feed back as actions
//!
//! Reducers compose with [`combine`] and lift across state/action domains
//! with [`pullback`]; [`Store::scope`] and [`Store::view`] derive restricted
//! or duplicate-suppressed projections for consumers.

mod cancellation;
mod effect;
mod reducer;
mod store;
mod subscription;
mod view;

pub use cancellation::CancelScope;
pub use effect::{CancelId, Effect};
pub use reducer::{combine, logging, pullback, Lens, Prism, Reducer};
pub use store::Store;
pub use subscription::Subscription;
pub use view::ViewStore;
