mod common;

use common::{app_reducer, AppAction, AppEnv, AppState, PrimeAlert};
use rudder::{combine, logging, pullback, Effect, Lens, Prism, Reducer, Store};

// -- combine ------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Recorded {
    reduced: Vec<&'static str>,
    effects_seen: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RecordAction {
    Go,
    Mark(&'static str),
}

fn recording(tag: &'static str) -> Reducer<Recorded, RecordAction, ()> {
    Box::new(move |state, action, _env| match action {
        RecordAction::Go => {
            state.reduced.push(tag);
            vec![Effect::sync(move || RecordAction::Mark(tag))]
        }
        RecordAction::Mark(mark) => {
            state.effects_seen.push(mark);
            Vec::new()
        }
    })
}

#[test]
fn combine_runs_reducers_and_effects_in_listed_order() {
    let store = Store::new(
        Recorded::default(),
        combine(vec![recording("first"), recording("second")]),
        (),
    );

    store.send(RecordAction::Go);

    let state = store.state();
    assert_eq!(state.reduced, vec!["first", "second"]);
    // Effect outputs drain FIFO, so observed order matches the effect list.
    assert_eq!(state.effects_seen, vec!["first", "second"]);
}

#[test]
fn later_reducers_see_earlier_mutations() {
    let doubler: Reducer<i64, (), ()> = Box::new(|state, _action, _env| {
        *state *= 2;
        Vec::new()
    });
    let incrementer: Reducer<i64, (), ()> = Box::new(|state, _action, _env| {
        *state += 1;
        Vec::new()
    });

    // (3 * 2) + 1, not (3 + 1) * 2.
    let store = Store::new(3_i64, combine(vec![doubler, incrementer]), ());
    store.send(());
    assert_eq!(store.state(), 7);
}

// -- pullback -----------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct GlobalState {
    counter: AppState,
    settings_opens: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GlobalAction {
    Counter(AppAction),
    OpenSettings,
}

#[derive(Clone)]
struct GlobalEnv {
    app: AppEnv,
}

fn counter_lens() -> Lens<GlobalState, AppState> {
    Lens::new(
        |global: &GlobalState| global.counter.clone(),
        |global, counter| global.counter = counter,
    )
}

fn counter_prism() -> Prism<GlobalAction, AppAction> {
    Prism::new(
        |action: &GlobalAction| match action {
            GlobalAction::Counter(app) => Some(app.clone()),
            GlobalAction::OpenSettings => None,
        },
        GlobalAction::Counter,
    )
}

fn lifted_app_reducer() -> Reducer<GlobalState, GlobalAction, GlobalEnv> {
    pullback(app_reducer(), counter_lens(), counter_prism(), |env: &GlobalEnv| {
        env.app.clone()
    })
}

#[test]
fn pullback_ignores_foreign_actions() {
    let mut state = GlobalState {
        counter: AppState {
            count: 9,
            ..AppState::default()
        },
        settings_opens: 0,
    };
    let before = state.clone();

    let effects = lifted_app_reducer()(&mut state, GlobalAction::OpenSettings, &GlobalEnv {
        app: AppEnv::live(),
    });

    assert_eq!(state, before);
    assert!(effects.is_empty());
}

#[test]
fn pullback_hit_matches_direct_local_reduction() {
    let env = GlobalEnv { app: AppEnv::live() };

    let mut global = GlobalState {
        counter: AppState {
            count: 4,
            ..AppState::default()
        },
        settings_opens: 3,
    };
    lifted_app_reducer()(
        &mut global,
        GlobalAction::Counter(AppAction::Increment),
        &env,
    );

    let mut local = AppState {
        count: 4,
        ..AppState::default()
    };
    app_reducer()(&mut local, AppAction::Increment, &env.app);

    assert_eq!(global.counter, local);
    assert_eq!(global.settings_opens, 3);
}

#[test]
fn pullback_embeds_effect_outputs_into_global_actions() {
    let store = Store::new(
        GlobalState {
            counter: AppState {
                count: 7,
                ..AppState::default()
            },
            settings_opens: 0,
        },
        lifted_app_reducer(),
        GlobalEnv { app: AppEnv::live() },
    );

    // The local response effect comes back as GlobalAction::Counter(..)
    // and lands in the counter slice.
    store.send(GlobalAction::Counter(AppAction::RequestNthPrime));

    assert_eq!(
        store.state().counter.alert,
        Some(PrimeAlert { n: 7, prime: 17 })
    );
    assert!(!store.state().counter.in_flight);
}

#[test]
fn combined_pullbacks_route_actions_to_their_feature() {
    let settings: Reducer<GlobalState, GlobalAction, GlobalEnv> =
        Box::new(|state, action, _env| {
            if let GlobalAction::OpenSettings = action {
                state.settings_opens += 1;
            }
            Vec::new()
        });

    let store = Store::new(
        GlobalState::default(),
        combine(vec![lifted_app_reducer(), settings]),
        GlobalEnv { app: AppEnv::live() },
    );

    store.send(GlobalAction::OpenSettings);
    store.send(GlobalAction::Counter(AppAction::Increment));

    assert_eq!(store.state().settings_opens, 1);
    assert_eq!(store.state().counter.count, 1);
}

// -- logging ------------------------------------------------------------------

#[test]
fn logging_does_not_change_observable_behavior() {
    let plain = Store::new(
        AppState {
            count: 7,
            ..AppState::default()
        },
        app_reducer(),
        AppEnv::live(),
    );
    let logged = Store::new(
        AppState {
            count: 7,
            ..AppState::default()
        },
        logging(app_reducer()),
        AppEnv::live(),
    );

    for store in [&plain, &logged] {
        store.send(AppAction::Increment);
        store.send(AppAction::RequestNthPrime);
    }

    assert_eq!(plain.state(), logged.state());
}
