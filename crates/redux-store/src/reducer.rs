use crate::error::ReducerError;
use std::sync::Arc;

/// Result of a single reduction
pub type Reduced<S> = Result<Arc<S>, ReducerError>;

/// Reducer - pure function that produces new state from current state + action
///
/// Implementations must be deterministic and must not mutate `state`. For an
/// action they do not handle they return `Arc::clone(state)`, so callers can
/// detect "nothing changed" with [`Arc::ptr_eq`].
pub trait Reducer<S, A>: Send + Sync + 'static {
    fn reduce(&self, state: &Arc<S>, action: &A) -> Reduced<S>;
}

/// Adapter turning a closure into a [`Reducer`]
pub struct FnReducer<F>(F);

/// Wrap a closure as a reducer
///
/// ```
/// use redux_store::{reducer_fn, Reducer};
/// use std::sync::Arc;
///
/// # struct Counter {
/// #     counter: i64,
/// # }
/// let reducer = reducer_fn(|state: &Arc<Counter>, action: &&'static str| match *action {
///     "increment" => Ok(Arc::new(Counter { counter: state.counter + 1 })),
///     _ => Ok(Arc::clone(state)),
/// });
///
/// let next = reducer.reduce(&Arc::new(Counter { counter: 0 }), &"increment").unwrap();
/// assert_eq!(next.counter, 1);
/// ```
pub fn reducer_fn<S, A, F>(f: F) -> FnReducer<F>
where
    F: Fn(&Arc<S>, &A) -> Reduced<S> + Send + Sync + 'static,
{
    FnReducer(f)
}

impl<S, A, F> Reducer<S, A> for FnReducer<F>
where
    F: Fn(&Arc<S>, &A) -> Reduced<S> + Send + Sync + 'static,
{
    fn reduce(&self, state: &Arc<S>, action: &A) -> Reduced<S> {
        (self.0)(state, action)
    }
}

/// Fold a reducer over a sequence of actions starting at `initial`
///
/// Dispatching the same actions to a store seeded with `initial` yields the
/// same state.
pub fn replay<'a, S, A, R>(
    reducer: &R,
    initial: Arc<S>,
    actions: impl IntoIterator<Item = &'a A>,
) -> Reduced<S>
where
    A: 'a,
    R: Reducer<S, A> + ?Sized,
{
    actions
        .into_iter()
        .try_fold(initial, |state, action| reducer.reduce(&state, action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        counter: i64,
    }

    fn counter_reducer() -> impl Reducer<Counter, &'static str> {
        reducer_fn(|state: &Arc<Counter>, action: &&'static str| match *action {
            "increment" => Ok(Arc::new(Counter {
                counter: state.counter + 1,
            })),
            "decrement" => Ok(Arc::new(Counter {
                counter: state.counter - 1,
            })),
            "explode" => Err(ReducerError::rejected("explode is not allowed")),
            _ => Ok(Arc::clone(state)),
        })
    }

    #[test]
    fn test_replay_folds_actions() {
        let reducer = counter_reducer();
        let initial = Arc::new(Counter { counter: 0 });

        let state = replay(&reducer, initial, &["increment", "increment", "decrement"]).unwrap();
        assert_eq!(*state, Counter { counter: 1 });
    }

    #[test]
    fn test_unknown_action_returns_same_arc() {
        let reducer = counter_reducer();
        let initial = Arc::new(Counter { counter: 7 });

        let next = reducer.reduce(&initial, &"noop").unwrap();
        assert!(Arc::ptr_eq(&initial, &next));
    }

    #[test]
    fn test_replay_stops_at_first_error() {
        let reducer = counter_reducer();
        let initial = Arc::new(Counter { counter: 0 });

        let result = replay(&reducer, initial, &["increment", "explode", "increment"]);
        assert!(matches!(result, Err(ReducerError::Rejected(_))));
    }

    #[test]
    fn test_replay_of_nothing_is_initial() {
        let reducer = counter_reducer();
        let initial = Arc::new(Counter { counter: 3 });

        let no_actions: [&'static str; 0] = [];
        let state = replay(&reducer, Arc::clone(&initial), &no_actions).unwrap();
        assert!(Arc::ptr_eq(&initial, &state));
    }
}
