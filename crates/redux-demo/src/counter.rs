//! Plain counter store: increment and decrement with a logging subscriber

use anyhow::Result;
use redux_store::{reducer_fn, Action, LoggingMiddleware, Reduced, Store, StoreError};
use redux_store_config::DemoConfig;
use serde::Serialize;
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CounterState {
    pub counter: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterAction {
    Increment,
    Decrement,
}

impl Action for CounterAction {
    fn kind(&self) -> &str {
        match self {
            CounterAction::Increment => "increment",
            CounterAction::Decrement => "decrement",
        }
    }
}

/// Reducer for the counter
pub fn reduce(state: &Arc<CounterState>, action: &CounterAction) -> Reduced<CounterState> {
    let counter = match action {
        CounterAction::Increment => state.counter + 1,
        CounterAction::Decrement => state.counter - 1,
    };
    Ok(Arc::new(CounterState { counter }))
}

pub fn build_store(config: &DemoConfig) -> Result<Store<CounterState, CounterAction>, StoreError> {
    let builder = Store::builder()
        .reducer(reducer_fn(reduce))
        .initial_state(CounterState::default())
        .listener_policy(config.listener_error_policy);

    if config.log_actions {
        builder.middleware(LoggingMiddleware::new()).build()
    } else {
        builder.build()
    }
}

/// Subscribe a listener that prints every new state
pub fn subscribe_printer(store: &Arc<Store<CounterState, CounterAction>>) {
    let weak: Weak<Store<CounterState, CounterAction>> = Arc::downgrade(store);
    store.subscribe(move || {
        if let Some(store) = weak.upgrade() {
            println!("{}", serde_json::to_string(&*store.get_state())?);
        }
        Ok(())
    });
}

pub fn run(config: &DemoConfig) -> Result<()> {
    let store = Arc::new(build_store(config)?);
    subscribe_printer(&store);

    println!("{}", serde_json::to_string(&*store.get_state())?);
    store.dispatch(CounterAction::Increment)?;
    store.dispatch(CounterAction::Decrement)?;

    log::info!("Counter finished at {}", store.get_state().counter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_increment_then_decrement() {
        let store = build_store(&DemoConfig::default()).unwrap();

        store.dispatch(CounterAction::Increment).unwrap();
        assert_eq!(*store.get_state(), CounterState { counter: 1 });

        store.dispatch(CounterAction::Decrement).unwrap();
        assert_eq!(*store.get_state(), CounterState { counter: 0 });
    }

    #[test]
    fn test_subscriber_runs_per_dispatch() {
        let config = DemoConfig {
            log_actions: false,
            ..DemoConfig::default()
        };
        let store = Arc::new(build_store(&config).unwrap());
        subscribe_printer(&store);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        store.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        store.dispatch(CounterAction::Increment).unwrap();
        store.dispatch(CounterAction::Increment).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.listener_count(), 2);
    }

    #[test]
    fn test_state_serializes_like_the_js_object() {
        assert_eq!(
            serde_json::to_string(&CounterState { counter: 3 }).unwrap(),
            r#"{"counter":3}"#
        );
    }
}
