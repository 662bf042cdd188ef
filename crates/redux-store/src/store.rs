use crate::action::Action;
use crate::error::{panic_message, ListenerFailure, StoreError};
use crate::middleware::{Dispatcher, Middleware};
use crate::reducer::Reducer;
use crate::subscription::{Registry, Subscription};
use crate::BoxError;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

/// What a store does when a listener fails during a notification pass
///
/// Either way every remaining listener of the pass still runs and the new
/// state stays committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListenerErrorPolicy {
    /// Log each failure and report success to the dispatcher
    #[default]
    LogAndContinue,
    /// Collect every failure and return them from `dispatch` after the pass
    Collect,
}

#[derive(Debug, Clone, Copy, Default)]
struct Phase {
    depth: usize,
    reducing: bool,
}

/// Store - holds state and runs the dispatch loop
///
/// The Store follows the Redux pattern:
/// - A single state value, replaced wholesale on each action
/// - Pure reducers handle state transitions
/// - Listeners are notified after every committed transition
///
/// All methods take `&self`; share a store between threads with an `Arc`.
/// Dispatches are serialised by a re-entrant lock around
/// reduce-commit-notify, so a listener may dispatch again from within its
/// callback on the same thread.
pub struct Store<S, A> {
    state: RwLock<Arc<S>>,
    reducer: RwLock<Arc<dyn Reducer<S, A>>>,
    listeners: Arc<Registry>,
    middleware: Vec<Box<dyn Middleware<S, A>>>,
    dispatcher: Dispatcher<A>,
    pending: Mutex<Receiver<A>>,
    phase: ReentrantMutex<Cell<Phase>>,
    policy: ListenerErrorPolicy,
}

impl<S, A> Store<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    /// Create a store without middleware using the default listener policy
    pub fn new(reducer: impl Reducer<S, A>, initial_state: impl Into<Arc<S>>) -> Self {
        Self::from_parts(
            Arc::new(reducer),
            initial_state.into(),
            Vec::new(),
            ListenerErrorPolicy::default(),
        )
    }

    pub fn builder() -> StoreBuilder<S, A> {
        StoreBuilder::new()
    }

    fn from_parts(
        reducer: Arc<dyn Reducer<S, A>>,
        initial_state: Arc<S>,
        middleware: Vec<Box<dyn Middleware<S, A>>>,
        policy: ListenerErrorPolicy,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::channel();
        log::debug!(
            "Store created with {} middleware, listener policy {:?}",
            middleware.len(),
            policy
        );
        Self {
            state: RwLock::new(initial_state),
            reducer: RwLock::new(reducer),
            listeners: Arc::new(Registry::default()),
            middleware,
            dispatcher: Dispatcher::new(action_tx),
            pending: Mutex::new(action_rx),
            phase: ReentrantMutex::new(Cell::new(Phase::default())),
            policy,
        }
    }

    /// Get the current state
    pub fn get_state(&self) -> Arc<S> {
        Arc::clone(&self.state.read())
    }

    /// Get the dispatcher used to queue follow-up actions
    pub fn dispatcher(&self) -> &Dispatcher<A> {
        &self.dispatcher
    }

    pub fn listener_policy(&self) -> ListenerErrorPolicy {
        self.policy
    }

    /// Process an action through middleware chain, reducer and listeners
    ///
    /// Returns the dispatched action so calls can be chained. On a reducer
    /// error or panic the state is left untouched and the store stays
    /// usable. With [`ListenerErrorPolicy::Collect`] listener failures are
    /// returned as [`StoreError::Listeners`] after the state was committed.
    ///
    /// Follow-up actions queued by middleware are dispatched before the
    /// outermost call returns. If the action itself succeeded but follow-ups
    /// failed, their errors come back together as [`StoreError::FollowUps`];
    /// the action's own transition stays committed. If the action itself
    /// failed, that error is returned and follow-up failures are only logged.
    pub fn dispatch(&self, action: A) -> Result<A, StoreError> {
        if action.kind().is_empty() {
            return Err(StoreError::MissingActionKind);
        }

        let phase = self.phase.lock();
        if phase.get().reducing {
            return Err(StoreError::DispatchFromReducer(action.kind().to_string()));
        }

        let outermost = phase.get().depth == 0;
        let result = self.run(&phase, action);
        if !outermost {
            return result;
        }

        // Follow-ups queued by middleware run once the outermost pass is done
        let failures = self.drain_follow_ups(&phase);
        match result {
            Ok(_) if !failures.is_empty() => Err(StoreError::FollowUps(failures)),
            result => result,
        }
    }

    /// Register a listener, called with no arguments after every commit
    ///
    /// A listener added while a notification pass is running is first
    /// called on the next dispatch.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let id = self.listeners.insert(Arc::new(listener));
        log::debug!("Listener #{} subscribed", id);
        Subscription::new(id, &self.listeners)
    }

    /// Swap the reducer; not allowed from inside a dispatch
    pub fn replace_reducer(&self, reducer: impl Reducer<S, A>) -> Result<(), StoreError> {
        let phase = self.phase.lock();
        if phase.get().depth > 0 {
            return Err(StoreError::ReplaceWhileDispatching);
        }
        *self.reducer.write() = Arc::new(reducer);
        log::debug!("Reducer replaced");
        Ok(())
    }

    /// Drop every listener reference
    pub fn clear_listeners(&self) -> usize {
        let removed = self.listeners.clear();
        log::debug!("Cleared {} listener(s)", removed);
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether a dispatch is running, on this thread or another one
    pub fn is_dispatching(&self) -> bool {
        match self.phase.try_lock() {
            Some(phase) => phase.get().depth > 0,
            None => true,
        }
    }

    fn run(&self, phase: &Cell<Phase>, action: A) -> Result<A, StoreError> {
        let _depth = DepthGuard::enter(phase);
        self.process(phase, action)
    }

    fn process(&self, phase: &Cell<Phase>, action: A) -> Result<A, StoreError> {
        let state = self.get_state();

        for middleware in &self.middleware {
            if !middleware.handle(&action, &state, &self.dispatcher) {
                log::debug!("Action `{}` consumed by middleware", action.kind());
                return Ok(action);
            }
        }

        let reducer = Arc::clone(&self.reducer.read());
        let next = self.reduce(phase, reducer.as_ref(), &state, &action)?;

        if Arc::ptr_eq(&state, &next) {
            log::trace!("Action `{}` left state unchanged", action.kind());
        }
        *self.state.write() = next;

        self.notify()?;
        Ok(action)
    }

    fn reduce(
        &self,
        phase: &Cell<Phase>,
        reducer: &dyn Reducer<S, A>,
        state: &Arc<S>,
        action: &A,
    ) -> Result<Arc<S>, StoreError> {
        phase.set(Phase {
            reducing: true,
            ..phase.get()
        });
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| reducer.reduce(state, action)));
        phase.set(Phase {
            reducing: false,
            ..phase.get()
        });

        match outcome {
            Ok(Ok(next)) => Ok(next),
            Ok(Err(source)) => {
                log::warn!("Reducer rejected `{}`: {}", action.kind(), source);
                Err(StoreError::Reducer {
                    kind: action.kind().to_string(),
                    source,
                })
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("Reducer panicked on `{}`: {}", action.kind(), message);
                Err(StoreError::ReducerPanicked {
                    kind: action.kind().to_string(),
                    message,
                })
            }
        }
    }

    fn notify(&self) -> Result<(), StoreError> {
        let mut failures = Vec::new();

        for (id, listener) in self.listeners.snapshot() {
            // Unsubscribed earlier in this pass
            if !self.listeners.contains(id) {
                continue;
            }

            let failure = match panic::catch_unwind(AssertUnwindSafe(|| listener())) {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => ListenerFailure {
                    subscription_id: id,
                    message: e.to_string(),
                    panicked: false,
                },
                Err(payload) => ListenerFailure {
                    subscription_id: id,
                    message: panic_message(payload.as_ref()),
                    panicked: true,
                },
            };

            match self.policy {
                ListenerErrorPolicy::LogAndContinue => log::error!("{}", failure),
                ListenerErrorPolicy::Collect => {
                    log::warn!("{}", failure);
                    failures.push(failure);
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Listeners(failures))
        }
    }

    /// Run queued follow-ups one after another at the outermost level
    ///
    /// Follow-ups queued while draining are picked up by the same loop.
    fn drain_follow_ups(&self, phase: &Cell<Phase>) -> Vec<StoreError> {
        let mut failures = Vec::new();
        loop {
            let next = self.pending.lock().try_recv();
            let Ok(action) = next else {
                break;
            };

            let result = if action.kind().is_empty() {
                Err(StoreError::MissingActionKind)
            } else {
                self.run(phase, action)
            };
            if let Err(e) = result {
                log::error!("Follow-up action failed: {}", e);
                failures.push(e);
            }
        }
        failures
    }
}

/// Tracks dispatch nesting and restores it even if middleware panics
struct DepthGuard<'a> {
    phase: &'a Cell<Phase>,
}

impl<'a> DepthGuard<'a> {
    fn enter(phase: &'a Cell<Phase>) -> Self {
        let current = phase.get();
        phase.set(Phase {
            depth: current.depth + 1,
            ..current
        });
        Self { phase }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        let current = self.phase.get();
        self.phase.set(Phase {
            depth: current.depth.saturating_sub(1),
            ..current
        });
    }
}

/// Builder for stores with middleware or a non-default listener policy
pub struct StoreBuilder<S, A> {
    reducer: Option<Arc<dyn Reducer<S, A>>>,
    initial_state: Option<Arc<S>>,
    middleware: Vec<Box<dyn Middleware<S, A>>>,
    policy: ListenerErrorPolicy,
}

impl<S, A> StoreBuilder<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    pub fn new() -> Self {
        Self {
            reducer: None,
            initial_state: None,
            middleware: Vec::new(),
            policy: ListenerErrorPolicy::default(),
        }
    }

    pub fn reducer(mut self, reducer: impl Reducer<S, A>) -> Self {
        self.reducer = Some(Arc::new(reducer));
        self
    }

    pub fn initial_state(mut self, state: impl Into<Arc<S>>) -> Self {
        self.initial_state = Some(state.into());
        self
    }

    /// Add middleware; it runs in the order it was added
    pub fn middleware<M: Middleware<S, A> + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    pub fn listener_policy(mut self, policy: ListenerErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Result<Store<S, A>, StoreError> {
        let reducer = self.reducer.ok_or(StoreError::MissingReducer)?;
        let initial_state = self.initial_state.ok_or(StoreError::MissingInitialState)?;
        Ok(Store::from_parts(
            reducer,
            initial_state,
            self.middleware,
            self.policy,
        ))
    }
}

impl<S, A> Default for StoreBuilder<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    fn default() -> Self {
        Self::new()
    }
}
