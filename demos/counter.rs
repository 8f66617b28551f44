//! Counter demo: a small feature built entirely on the public store surface.
//!
//! Shows a feature reducer pulled back into an app reducer, a keyed
//! cancellable effect against an async service, and a failure mapped into an
//! ordinary response action. Run with:
//!
//! ```text
//! cargo run --example counter
//! ```

use std::sync::Arc;
use std::time::Duration;

use rudder::{combine, logging, pullback, Effect, Lens, Prism, Reducer, Store};
use thiserror::Error;

#[derive(Debug, Error)]
enum PrimeServiceError {
    #[error("prime index {0} out of supported range")]
    OutOfRange(i64),
}

/// Stand-in for a remote prime-lookup API.
struct PrimeService;

impl PrimeService {
    async fn nth_prime(&self, n: i64) -> Result<i64, PrimeServiceError> {
        if !(1..=10_000).contains(&n) {
            return Err(PrimeServiceError::OutOfRange(n));
        }
        // Simulated network latency; a second request issued while this one
        // sleeps supersedes it via the shared cancellation key.
        tokio::time::sleep(Duration::from_millis(150)).await;
        let mut found = 0;
        let mut candidate = 1_i64;
        while found < n {
            candidate += 1;
            if (2..candidate).all(|d| candidate % d != 0) {
                found += 1;
            }
        }
        Ok(candidate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CounterState {
    count: i64,
    in_flight: bool,
    alert: Option<String>,
}

#[derive(Debug, Clone)]
enum CounterAction {
    Increment,
    Decrement,
    RequestNthPrime,
    NthPrimeResponse { n: i64, outcome: Result<i64, String> },
}

#[derive(Clone)]
struct CounterEnv {
    primes: Arc<PrimeService>,
}

fn counter_reducer() -> Reducer<CounterState, CounterAction, CounterEnv> {
    Box::new(|state, action, env| match action {
        CounterAction::Increment => {
            state.count += 1;
            Vec::new()
        }
        CounterAction::Decrement => {
            state.count -= 1;
            Vec::new()
        }
        CounterAction::RequestNthPrime => {
            state.in_flight = true;
            let n = state.count;
            let primes = Arc::clone(&env.primes);
            vec![Effect::future(async move {
                // Failures never escape an effect; they become response
                // actions like any other outcome.
                let outcome = primes.nth_prime(n).await.map_err(|err| err.to_string());
                CounterAction::NthPrimeResponse { n, outcome }
            })
            .cancellable("nth-prime")]
        }
        CounterAction::NthPrimeResponse { n, outcome } => {
            state.in_flight = false;
            state.alert = Some(match outcome {
                Ok(prime) => format!("the {n}th prime is {prime}"),
                Err(message) => format!("prime lookup failed: {message}"),
            });
            Vec::new()
        }
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct AppState {
    counter: CounterState,
}

#[derive(Debug, Clone)]
enum AppAction {
    Counter(CounterAction),
}

fn app_reducer() -> Reducer<AppState, AppAction, CounterEnv> {
    logging(combine(vec![pullback(
        counter_reducer(),
        Lens::new(
            |app: &AppState| app.counter.clone(),
            |app, counter| app.counter = counter,
        ),
        Prism::new(
            |action: &AppAction| {
                let AppAction::Counter(counter) = action;
                Some(counter.clone())
            },
            AppAction::Counter,
        ),
        |env: &CounterEnv| env.clone(),
    )]))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let store = Store::new(
        AppState::default(),
        app_reducer(),
        CounterEnv {
            primes: Arc::new(PrimeService),
        },
    );

    let view = store.view();
    let _sub = view.observe(|state: &AppState| {
        tracing::info!(count = state.counter.count, alert = ?state.counter.alert, "committed");
    });

    for _ in 0..8 {
        view.send(AppAction::Counter(CounterAction::Increment));
    }
    view.send(AppAction::Counter(CounterAction::Decrement));

    // Two requests in flight under one key: the first is superseded and
    // only the second delivers.
    view.send(AppAction::Counter(CounterAction::RequestNthPrime));
    view.send(AppAction::Counter(CounterAction::Increment));
    view.send(AppAction::Counter(CounterAction::RequestNthPrime));

    tokio::time::sleep(Duration::from_millis(400)).await;
    tracing::info!(alert = ?view.value().counter.alert, "final");
}
