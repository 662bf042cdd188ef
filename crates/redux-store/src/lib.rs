//! Redux-style state container
//!
//! This crate provides:
//! - [`Store`]: single source of truth, dispatch entry point and subscriber registry
//! - [`Reducer`]: pure `(state, action) -> state` functions
//! - [`Middleware`]: hooks that see every action before the reducer
//! - [`Slice`] and [`CombinedReducer`]: named case reducers composed into one root
//!
//! ```
//! use redux_store::{reducer_fn, Action, Reduced, Store};
//! use std::sync::Arc;
//!
//! # #[derive(Debug)]
//! # enum CounterAction {
//! #     Increment,
//! # }
//! #
//! # impl Action for CounterAction {
//! #     fn kind(&self) -> &str {
//! #         "increment"
//! #     }
//! # }
//! #
//! struct Counter {
//!     counter: i64,
//! }
//!
//! fn counter_reducer(state: &Arc<Counter>, action: &CounterAction) -> Reduced<Counter> {
//!     match action {
//!         CounterAction::Increment => Ok(Arc::new(Counter { counter: state.counter + 1 })),
//!     }
//! }
//!
//! # fn main() -> Result<(), redux_store::StoreError> {
//! let store = Store::new(reducer_fn(counter_reducer), Counter { counter: 0 });
//! let subscription = store.subscribe(|| Ok(()));
//! store.dispatch(CounterAction::Increment)?;
//! assert_eq!(store.get_state().counter, 1);
//! subscription.unsubscribe();
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod combine;
pub mod error;
pub mod middleware;
pub mod reducer;
pub mod slice;
pub mod store;
pub mod subscription;

pub use action::{Action, SliceAction};
pub use combine::{CombinedReducer, CombinedState};
pub use error::{BoxError, CombineError, ListenerFailure, ReducerError, StoreError};
pub use middleware::{Dispatcher, LoggingMiddleware, Middleware};
pub use reducer::{reducer_fn, replay, FnReducer, Reduced, Reducer};
pub use slice::Slice;
pub use store::{ListenerErrorPolicy, Store, StoreBuilder};
pub use subscription::{Listener, Subscription, SubscriptionId};
