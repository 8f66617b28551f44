//! Shared test fixtures: a counter feature with an nth-prime lookup,
//! exercising the store contract the way an application would.

#![allow(dead_code)]

use std::sync::Arc;

use rudder::{Effect, Reducer, Store};

pub const NTH_PRIME_KEY: &str = "nth-prime";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeAlert {
    pub n: i64,
    pub prime: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub count: i64,
    pub in_flight: bool,
    pub alert: Option<PrimeAlert>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Increment,
    Decrement,
    RequestNthPrime,
    NthPrimeResponse { n: i64, prime: Option<i64> },
    DismissAlert,
}

/// Dependencies injected into the app reducer. The prime lookup is swapped
/// per test so reducers stay deterministic.
#[derive(Clone)]
pub struct AppEnv {
    pub nth_prime: Arc<dyn Fn(i64) -> Option<i64> + Send + Sync>,
}

impl AppEnv {
    /// Environment whose lookup computes primes synchronously.
    pub fn live() -> Self {
        AppEnv {
            nth_prime: Arc::new(|n| Some(nth_prime(n))),
        }
    }

    /// Environment whose lookup always returns `prime`.
    pub fn constant(prime: i64) -> Self {
        AppEnv {
            nth_prime: Arc::new(move |_| Some(prime)),
        }
    }
}

/// Brute-force nth prime, 1-indexed: `nth_prime(7) == 17`.
pub fn nth_prime(n: i64) -> i64 {
    let mut found = 0;
    let mut candidate = 1_i64;
    while found < n {
        candidate += 1;
        if (2..candidate).all(|d| candidate % d != 0) {
            found += 1;
        }
    }
    candidate
}

pub fn app_reducer() -> Reducer<AppState, AppAction, AppEnv> {
    Box::new(|state, action, env| match action {
        AppAction::Increment => {
            state.count += 1;
            Vec::new()
        }
        AppAction::Decrement => {
            state.count -= 1;
            Vec::new()
        }
        AppAction::RequestNthPrime => {
            state.in_flight = true;
            let n = state.count;
            let lookup = Arc::clone(&env.nth_prime);
            vec![
                Effect::sync(move || AppAction::NthPrimeResponse { n, prime: (*lookup)(n) })
                    .cancellable(NTH_PRIME_KEY),
            ]
        }
        AppAction::NthPrimeResponse { n, prime } => {
            state.in_flight = false;
            state.alert = prime.map(|prime| PrimeAlert { n, prime });
            Vec::new()
        }
        AppAction::DismissAlert => {
            state.alert = None;
            Vec::new()
        }
    })
}

pub fn app_store(initial: AppState) -> Store<AppState, AppAction> {
    Store::new(initial, app_reducer(), AppEnv::live())
}
