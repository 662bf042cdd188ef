//! Counter and auth slices combined into one root store

use anyhow::Result;
use redux_store::{
    CombineError, CombinedReducer, CombinedState, LoggingMiddleware, ReducerError, Slice,
    SliceAction, Store, StoreError,
};
use redux_store_config::DemoConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const COUNTER: &str = "counter";
pub const AUTH: &str = "auth";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSliceState {
    pub counter: i64,
    pub show_counter: bool,
}

impl Default for CounterSliceState {
    fn default() -> Self {
        Self {
            counter: 0,
            show_counter: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_authenticated: bool,
}

pub fn counter_slice() -> Slice<CounterSliceState> {
    Slice::new(COUNTER, CounterSliceState::default())
        .case("increment", |state: &CounterSliceState, _: &SliceAction| {
            Ok(CounterSliceState {
                counter: state.counter + 1,
                ..state.clone()
            })
        })
        .case("decrease", |state: &CounterSliceState, _: &SliceAction| {
            Ok(CounterSliceState {
                counter: state.counter - 1,
                ..state.clone()
            })
        })
        .case("increase", |state: &CounterSliceState, action: &SliceAction| {
            let amount: i64 = action.payload_as()?;
            let counter = state.counter.checked_add(amount).ok_or_else(|| {
                ReducerError::rejected(format!("counter overflow adding {}", amount))
            })?;
            Ok(CounterSliceState {
                counter,
                ..state.clone()
            })
        })
        .case("toggleCounter", |state: &CounterSliceState, _: &SliceAction| {
            Ok(CounterSliceState {
                show_counter: !state.show_counter,
                ..state.clone()
            })
        })
}

pub fn auth_slice() -> Slice<AuthState> {
    Slice::new(AUTH, AuthState::default())
        .case("login", |_: &AuthState, _: &SliceAction| {
            Ok(AuthState {
                is_authenticated: true,
            })
        })
        .case("logout", |_: &AuthState, _: &SliceAction| {
            Ok(AuthState {
                is_authenticated: false,
            })
        })
}

/// Root reducer: `{ counter, auth }`
pub fn root_reducer() -> Result<CombinedReducer<SliceAction>, CombineError> {
    CombinedReducer::<SliceAction>::new()
        .with_slice(counter_slice())?
        .with_slice(auth_slice())
}

pub fn build_store(config: &DemoConfig) -> Result<Store<CombinedState, SliceAction>> {
    let reducer = root_reducer()?;
    let initial_state = reducer.initial_state();
    let builder = Store::builder()
        .reducer(reducer)
        .initial_state(initial_state)
        .listener_policy(config.listener_error_policy);

    let store = if config.log_actions {
        builder.middleware(LoggingMiddleware::new()).build()?
    } else {
        builder.build()?
    };
    Ok(store)
}

/// JSON view of the root state, one entry per slice
pub fn snapshot(state: &CombinedState) -> Value {
    let mut view = serde_json::Map::new();
    view.insert(
        COUNTER.to_string(),
        json!(state.get::<CounterSliceState>(COUNTER).as_deref()),
    );
    view.insert(
        AUTH.to_string(),
        json!(state.get::<AuthState>(AUTH).as_deref()),
    );
    Value::Object(view)
}

fn dispatch_case(
    store: &Store<CombinedState, SliceAction>,
    slice: &Slice<impl Send + Sync + 'static>,
    case: &str,
    payload: Value,
) -> Result<()> {
    let action = slice.action_with(case, payload)?;
    store.dispatch(action)?;
    Ok(())
}

pub fn run(config: &DemoConfig) -> Result<()> {
    let store = Arc::new(build_store(config)?);
    let counter = counter_slice();
    let auth = auth_slice();

    let weak = Arc::downgrade(&store);
    let subscription = store.subscribe(move || {
        if let Some(store) = weak.upgrade() {
            println!("{}", snapshot(&store.get_state()));
        }
        Ok(())
    });

    println!("{}", snapshot(&store.get_state()));
    dispatch_case(&store, &auth, "login", Value::Null)?;
    dispatch_case(&store, &counter, "increment", Value::Null)?;
    dispatch_case(&store, &counter, "increase", json!(10))?;
    dispatch_case(&store, &counter, "decrease", Value::Null)?;
    dispatch_case(&store, &counter, "toggleCounter", Value::Null)?;

    // A rejected action leaves the state as it was
    if let Err(e) = dispatch_case(&store, &counter, "increase", json!(i64::MAX)) {
        match e.downcast_ref::<StoreError>() {
            Some(err) if is_reducer_failure(err) => println!("rejected: {}", err),
            _ => return Err(e),
        }
    }

    subscription.unsubscribe();
    dispatch_case(&store, &auth, "logout", Value::Null)?;
    println!("after unsubscribe: {}", snapshot(&store.get_state()));
    Ok(())
}

/// Whether an error came from the reducer rather than from listeners
pub fn is_reducer_failure(err: &StoreError) -> bool {
    matches!(
        err,
        StoreError::Reducer { .. } | StoreError::ReducerPanicked { .. }
    )
}
