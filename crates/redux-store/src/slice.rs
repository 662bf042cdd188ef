//! Slices - a named reducer assembled from case reducers
//!
//! A slice owns its initial state and a set of case reducers keyed by name.
//! Action kinds take the form `<slice>/<case>`, so `counter/increment` is
//! routed to the `increment` case of the `counter` slice. Case reducers build
//! the next state explicitly (copy-with-changed-field) from a borrowed input:
//!
//! ```
//! use redux_store::{Reducer, Slice, SliceAction};
//!
//! # #[derive(Clone, Default)]
//! # struct CounterState {
//! #     counter: i64,
//! #     show_counter: bool,
//! # }
//! let counter: Slice<CounterState> = Slice::new("counter", CounterState::default())
//!     .case("increment", |state: &CounterState, _: &SliceAction| {
//!         Ok(CounterState { counter: state.counter + 1, ..state.clone() })
//!     });
//!
//! let action = counter.action("increment").unwrap();
//! let next = counter.reduce(&counter.initial_state(), &action).unwrap();
//! assert_eq!(next.counter, 1);
//! ```

use crate::action::SliceAction;
use crate::error::ReducerError;
use crate::reducer::{Reduced, Reducer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

type CaseReducer<S> = Box<dyn Fn(&S, &SliceAction) -> Result<S, ReducerError> + Send + Sync>;

pub struct Slice<S> {
    name: String,
    initial_state: Arc<S>,
    cases: BTreeMap<String, CaseReducer<S>>,
}

impl<S> Slice<S>
where
    S: Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, initial_state: impl Into<Arc<S>>) -> Self {
        Self {
            name: name.into(),
            initial_state: initial_state.into(),
            cases: BTreeMap::new(),
        }
    }

    /// Register a case reducer; a later registration under the same name wins
    pub fn case<F>(mut self, case: impl Into<String>, reducer: F) -> Self
    where
        F: Fn(&S, &SliceAction) -> Result<S, ReducerError> + Send + Sync + 'static,
    {
        let case = case.into();
        if self.cases.insert(case.clone(), Box::new(reducer)).is_some() {
            log::warn!("Slice `{}` redefined case `{}`", self.name, case);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_state(&self) -> Arc<S> {
        Arc::clone(&self.initial_state)
    }

    /// Fully qualified action kinds this slice handles, sorted by case name
    pub fn action_kinds(&self) -> Vec<String> {
        self.cases
            .keys()
            .map(|case| format!("{}/{}", self.name, case))
            .collect()
    }

    /// Build an action without payload for one of this slice's cases
    pub fn action(&self, case: &str) -> Result<SliceAction, ReducerError> {
        self.action_with(case, Value::Null)
    }

    /// Build an action with payload for one of this slice's cases
    pub fn action_with(&self, case: &str, payload: Value) -> Result<SliceAction, ReducerError> {
        if !self.cases.contains_key(case) {
            return Err(ReducerError::UnknownCase {
                slice: self.name.clone(),
                case: case.to_string(),
            });
        }
        Ok(SliceAction::with_payload(
            format!("{}/{}", self.name, case),
            payload,
        ))
    }
}

impl<S> Reducer<S, SliceAction> for Slice<S>
where
    S: Send + Sync + 'static,
{
    fn reduce(&self, state: &Arc<S>, action: &SliceAction) -> Reduced<S> {
        let case_reducer = match (action.slice_name(), action.case_name()) {
            (Some(slice), Some(case)) if slice == self.name => self.cases.get(case),
            _ => None,
        };

        match case_reducer {
            Some(reduce) => reduce(state, action).map(Arc::new),
            // Foreign or unknown kinds
            None => Ok(Arc::clone(state)),
        }
    }
}
