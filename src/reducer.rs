//! Reducer contract and composition.
//!
//! A reducer is the unit of business logic: given the current state, an
//! incoming action, and the environment of injected dependencies, it mutates
//! state to reflect the action and returns the effects to run next. The
//! state transition must be deterministic; only the returned effects may do
//! nondeterministic work.

use std::fmt::Debug;
use std::sync::Arc;

use crate::effect::Effect;

/// Pure state transition: `(state, action, env) -> effects`.
///
/// Boxed so reducers of different origins (hand-written closures, [`combine`]
/// results, [`pullback`] lifts) compose freely. A reducer with no
/// dependencies is spelled with `Env = ()`.
pub type Reducer<State, Action, Env> =
    Box<dyn Fn(&mut State, Action, &Env) -> Vec<Effect<Action>> + Send + Sync>;

/// Run `reducers` in listed order against the same state and action,
/// concatenating their effect lists in that order.
///
/// Order matters: later reducers see state already mutated by earlier ones
/// in the same call.
pub fn combine<State, Action, Env>(
    reducers: Vec<Reducer<State, Action, Env>>,
) -> Reducer<State, Action, Env>
where
    State: 'static,
    Action: Clone + 'static,
    Env: 'static,
{
    Box::new(move |state, action, env| {
        reducers
            .iter()
            .flat_map(|reducer| reducer(state, action.clone(), env))
            .collect()
    })
}

/// State projection for [`pullback`]: how to read a local state out of the
/// global one and write a mutated copy back.
pub struct Lens<Global, Local> {
    get: Box<dyn Fn(&Global) -> Local + Send + Sync>,
    set: Box<dyn Fn(&mut Global, Local) + Send + Sync>,
}

impl<Global, Local> Lens<Global, Local> {
    pub fn new(
        get: impl Fn(&Global) -> Local + Send + Sync + 'static,
        set: impl Fn(&mut Global, Local) + Send + Sync + 'static,
    ) -> Self {
        Lens {
            get: Box::new(get),
            set: Box::new(set),
        }
    }
}

/// Action projection for [`pullback`]: how to narrow a global action to the
/// local variant (if it is one) and embed local actions back.
pub struct Prism<Global, Local> {
    extract: Box<dyn Fn(&Global) -> Option<Local> + Send + Sync>,
    // Shared because every effect returned on a prism hit maps its outputs
    // through `embed`, each from its own task.
    embed: Arc<dyn Fn(Local) -> Global + Send + Sync>,
}

impl<Global, Local> Prism<Global, Local> {
    pub fn new(
        extract: impl Fn(&Global) -> Option<Local> + Send + Sync + 'static,
        embed: impl Fn(Local) -> Global + Send + Sync + 'static,
    ) -> Self {
        Prism {
            extract: Box::new(extract),
            embed: Arc::new(embed),
        }
    }
}

/// Lift a reducer over a local state/action/environment into one over the
/// global domain.
///
/// When the prism does not recognize the action, state is left untouched and
/// no effects are returned; this is how combined feature reducers ignore
/// actions that are not theirs. On a hit, the local reducer runs against the
/// focused state, the result is written back through the lens, and every
/// returned effect's outputs are re-embedded into the global action type.
pub fn pullback<LocalState, GlobalState, LocalAction, GlobalAction, LocalEnv, GlobalEnv>(
    reducer: Reducer<LocalState, LocalAction, LocalEnv>,
    lens: Lens<GlobalState, LocalState>,
    prism: Prism<GlobalAction, LocalAction>,
    to_local_env: impl Fn(&GlobalEnv) -> LocalEnv + Send + Sync + 'static,
) -> Reducer<GlobalState, GlobalAction, GlobalEnv>
where
    LocalState: 'static,
    GlobalState: 'static,
    LocalAction: Send + 'static,
    GlobalAction: Send + 'static,
    LocalEnv: 'static,
    GlobalEnv: 'static,
{
    Box::new(move |state, action, env| {
        let Some(local_action) = (prism.extract)(&action) else {
            return Vec::new();
        };
        let mut local_state = (lens.get)(state);
        let local_env = to_local_env(env);
        let effects = reducer(&mut local_state, local_action, &local_env);
        (lens.set)(state, local_state);

        effects
            .into_iter()
            .map(|effect| {
                let embed = Arc::clone(&prism.embed);
                effect.map(move |local| (*embed)(local))
            })
            .collect()
    })
}

/// Wrap `reducer` so each invocation additionally emits a diagnostic
/// fire-and-forget effect recording the action and the post-mutation state.
///
/// The diagnostic effect is first in the returned list, but effects carry no
/// cross-effect ordering guarantee; state and the inner effects pass through
/// unaltered.
pub fn logging<State, Action, Env>(
    reducer: Reducer<State, Action, Env>,
) -> Reducer<State, Action, Env>
where
    State: Debug + Clone + Send + 'static,
    Action: Debug + Clone + Send + 'static,
    Env: 'static,
{
    Box::new(move |state, action, env| {
        let dispatched = action.clone();
        let effects = reducer(state, action, env);
        let snapshot = state.clone();
        let mut out = Vec::with_capacity(effects.len() + 1);
        out.push(Effect::fire_and_forget(move || {
            tracing::debug!(action = ?dispatched, state = ?snapshot, "reduced");
        }));
        out.extend(effects);
        out
    })
}
