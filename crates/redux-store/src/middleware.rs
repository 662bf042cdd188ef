//! Middleware system
//!
//! Middleware sits between dispatch and the reducer:
//!
//! ```text
//! Action → Middleware Chain → Reducer → State → Listeners
//! ```
//!
//! Each middleware can:
//! - Inspect the action and the current state
//! - Queue follow-up actions through the [`Dispatcher`]
//! - Consume the action so it never reaches the reducer (return `false`)
//!
//! Follow-up actions are dispatched once the outermost dispatch has finished
//! notifying listeners, each one passing through the full chain again. Their
//! failures are returned from that outermost dispatch as
//! [`crate::StoreError::FollowUps`].

use crate::action::Action;
use std::sync::mpsc::Sender;

/// Middleware trait - intercepts actions before they reach the reducer
pub trait Middleware<S, A>: Send + Sync {
    /// Handle an action
    ///
    /// - `action`: The action being dispatched
    /// - `state`: Current state (read-only)
    /// - `dispatcher`: Queue follow-up actions that re-enter the chain
    ///
    /// Returns `true` to continue the chain, `false` to consume the action
    fn handle(&self, action: &A, state: &S, dispatcher: &Dispatcher<A>) -> bool;
}

/// Dispatcher for queueing actions from middleware
///
/// Actions queued here are not reduced immediately; the store drains the
/// queue after the current dispatch, so middleware never recurses into itself.
pub struct Dispatcher<A> {
    action_tx: Sender<A>,
}

impl<A> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            action_tx: self.action_tx.clone(),
        }
    }
}

impl<A> std::fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl<A: Action> Dispatcher<A> {
    pub(crate) fn new(action_tx: Sender<A>) -> Self {
        Self { action_tx }
    }

    /// Queue an action to be dispatched after the current one
    pub fn dispatch(&self, action: A) {
        if let Err(e) = self.action_tx.send(action) {
            log::error!(
                "Dispatcher: failed to queue `{}`: store is gone",
                e.0.kind()
            );
        }
    }
}

/// LoggingMiddleware - logs all actions passing through
pub struct LoggingMiddleware {
    level: log::Level,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self {
            level: log::Level::Debug,
        }
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A: Action> Middleware<S, A> for LoggingMiddleware {
    fn handle(&self, action: &A, _state: &S, _dispatcher: &Dispatcher<A>) -> bool {
        log::log!(self.level, "Action: {} {:?}", action.kind(), action);
        true // Always pass action through
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_dispatcher_queues_in_order() {
        let (tx, rx) = mpsc::channel();
        let dispatcher = Dispatcher::new(tx);

        dispatcher.dispatch("first");
        dispatcher.clone().dispatch("second");

        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec!["first", "second"]);
    }

    #[test]
    fn test_dispatcher_survives_dropped_receiver() {
        let (tx, rx) = mpsc::channel::<&'static str>();
        drop(rx);

        // Logged, not panicking
        Dispatcher::new(tx).dispatch("orphan");
    }

    #[test]
    fn test_logging_middleware_passes_through() {
        let (tx, _rx) = mpsc::channel();
        let dispatcher = Dispatcher::new(tx);

        assert!(LoggingMiddleware::new().handle(&"increment", &0_i64, &dispatcher));
        assert!(LoggingMiddleware::with_level(log::Level::Info).handle(
            &"decrement",
            &0_i64,
            &dispatcher
        ));
    }
}
