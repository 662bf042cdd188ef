//! Combined reducers
//!
//! A [`CombinedReducer`] hands every action to each keyed sub-reducer and
//! assembles the results into one [`CombinedState`] record. Sub-states keep
//! their own types; read them back with [`CombinedState::get`].

use crate::action::SliceAction;
use crate::error::{CombineError, ReducerError};
use crate::reducer::{Reduced, Reducer};
use crate::slice::Slice;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type ErasedState = Arc<dyn Any + Send + Sync>;

/// Keyed record of sub-states
#[derive(Clone, Default)]
pub struct CombinedState {
    slices: BTreeMap<String, ErasedState>,
}

impl CombinedState {
    /// Typed access to a sub-state; `None` for unknown keys or a wrong type
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let erased = Arc::clone(self.slices.get(key)?);
        erased.downcast::<T>().ok()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.slices.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Whether the sub-state under `key` is the same allocation in both records
    pub fn same_slice(&self, other: &CombinedState, key: &str) -> bool {
        match (self.slices.get(key), other.slices.get(key)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for CombinedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.slices.keys()).finish()
    }
}

trait ErasedReducer<A>: Send + Sync {
    fn reduce(&self, state: &ErasedState, action: &A) -> Result<ErasedState, ReducerError>;
}

struct Typed<S, R> {
    reducer: R,
    _state: PhantomData<fn() -> S>,
}

impl<S, A, R> ErasedReducer<A> for Typed<S, R>
where
    S: Any + Send + Sync,
    R: Reducer<S, A>,
{
    fn reduce(&self, state: &ErasedState, action: &A) -> Result<ErasedState, ReducerError> {
        let typed = Arc::clone(state)
            .downcast::<S>()
            .map_err(|_| ReducerError::rejected("sub-state has an unexpected type"))?;
        let next = self.reducer.reduce(&typed, action)?;
        if Arc::ptr_eq(&typed, &next) {
            Ok(Arc::clone(state))
        } else {
            Ok(next as ErasedState)
        }
    }
}

/// Root reducer built from keyed sub-reducers
pub struct CombinedReducer<A> {
    reducers: Vec<(String, Box<dyn ErasedReducer<A>>)>,
    initial_state: CombinedState,
}

impl<A: 'static> CombinedReducer<A> {
    pub fn new() -> Self {
        Self {
            reducers: Vec::new(),
            initial_state: CombinedState::default(),
        }
    }

    /// Add a sub-reducer under `key` together with its initial state
    pub fn slice<S, R>(
        mut self,
        key: impl Into<String>,
        initial_state: impl Into<Arc<S>>,
        reducer: R,
    ) -> Result<Self, CombineError>
    where
        S: Any + Send + Sync,
        R: Reducer<S, A>,
    {
        let key = key.into();
        if key.is_empty() {
            return Err(CombineError::EmptyKey);
        }
        if self.initial_state.contains_key(&key) {
            return Err(CombineError::DuplicateKey(key));
        }

        let initial: Arc<S> = initial_state.into();
        self.initial_state.slices.insert(key.clone(), initial);
        self.reducers.push((
            key,
            Box::new(Typed {
                reducer,
                _state: PhantomData,
            }),
        ));
        Ok(self)
    }

    /// The record made of every sub-reducer's initial state
    pub fn initial_state(&self) -> CombinedState {
        self.initial_state.clone()
    }
}

impl CombinedReducer<SliceAction> {
    /// Add a [`Slice`] under its own name
    pub fn with_slice<S>(self, slice: Slice<S>) -> Result<Self, CombineError>
    where
        S: Any + Send + Sync,
    {
        let key = slice.name().to_string();
        let initial = slice.initial_state();
        self.slice(key, initial, slice)
    }
}

impl<A: 'static> Default for CombinedReducer<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Reducer<CombinedState, A> for CombinedReducer<A>
where
    A: Send + Sync + 'static,
{
    fn reduce(&self, state: &Arc<CombinedState>, action: &A) -> Reduced<CombinedState> {
        let mut changed = state.len() != self.reducers.len();
        let mut slices = BTreeMap::new();

        for (key, reducer) in &self.reducers {
            let previous = match state.slices.get(key) {
                Some(previous) => Arc::clone(previous),
                None => {
                    changed = true;
                    match self.initial_state.slices.get(key) {
                        Some(initial) => Arc::clone(initial),
                        None => continue,
                    }
                }
            };

            let next = reducer
                .reduce(&previous, action)
                .map_err(|source| ReducerError::InSlice {
                    key: key.clone(),
                    source: Box::new(source),
                })?;
            changed |= !Arc::ptr_eq(&previous, &next);
            slices.insert(key.clone(), next);
        }

        if changed {
            Ok(Arc::new(CombinedState { slices }))
        } else {
            Ok(Arc::clone(state))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    struct CounterState {
        counter: i64,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct AuthState {
        is_authenticated: bool,
    }

    fn counter_slice() -> Slice<CounterState> {
        Slice::new("counter", CounterState { counter: 0 })
            .case("increase", |state: &CounterState, action: &SliceAction| {
                Ok(CounterState {
                    counter: state.counter + action.payload_as::<i64>()?,
                })
            })
            .case("fail", |_: &CounterState, _: &SliceAction| {
                Err(ReducerError::rejected("counter refused"))
            })
    }

    fn auth_slice() -> Slice<AuthState> {
        Slice::new(
            "auth",
            AuthState {
                is_authenticated: false,
            },
        )
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

    fn root() -> CombinedReducer<SliceAction> {
        CombinedReducer::<SliceAction>::new()
            .with_slice(counter_slice())
            .unwrap()
            .with_slice(auth_slice())
            .unwrap()
    }

    #[test]
    fn test_initial_state_is_keyed_record() {
        let state = root().initial_state();

        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["auth", "counter"]);
        assert_eq!(
            *state.get::<CounterState>("counter").unwrap(),
            CounterState { counter: 0 }
        );
        assert!(state.get::<AuthState>("counter").is_none());
        assert!(state.get::<AuthState>("missing").is_none());
    }

    #[test]
    fn test_action_reaches_only_its_slice() {
        let reducer = root();
        let state = Arc::new(reducer.initial_state());

        let next = reducer
            .reduce(
                &state,
                &SliceAction::with_payload("counter/increase", json!(5)),
            )
            .unwrap();

        assert_eq!(next.get::<CounterState>("counter").unwrap().counter, 5);
        assert!(next.same_slice(&state, "auth"));
        assert!(!next.same_slice(&state, "counter"));
    }

    #[test]
    fn test_unhandled_action_keeps_root_identity() {
        let reducer = root();
        let state = Arc::new(reducer.initial_state());

        let next = reducer.reduce(&state, &SliceAction::new("ui/toggle")).unwrap();
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn test_missing_key_is_filled_from_initial_state() {
        let reducer = root();
        let empty = Arc::new(CombinedState::default());

        let next = reducer.reduce(&empty, &SliceAction::new("auth/login")).unwrap();

        assert_eq!(next.len(), 2);
        assert!(next.get::<AuthState>("auth").unwrap().is_authenticated);
        assert_eq!(next.get::<CounterState>("counter").unwrap().counter, 0);
    }

    #[test]
    fn test_sub_reducer_error_names_the_slice() {
        let reducer = root();
        let state = Arc::new(reducer.initial_state());

        let err = reducer
            .reduce(&state, &SliceAction::new("counter/fail"))
            .unwrap_err();
        assert_eq!(err.to_string(), "slice `counter` failed: counter refused");
    }

    #[test]
    fn test_duplicate_and_empty_keys_rejected() {
        let duplicate = CombinedReducer::<SliceAction>::new()
            .with_slice(counter_slice())
            .unwrap()
            .with_slice(counter_slice());
        assert!(matches!(duplicate, Err(CombineError::DuplicateKey(ref key)) if key == "counter"));

        let empty = CombinedReducer::<SliceAction>::new().slice(
            "",
            CounterState { counter: 0 },
            counter_slice(),
        );
        assert!(matches!(empty, Err(CombineError::EmptyKey)));
    }
}
