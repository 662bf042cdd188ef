//! Error types for the store, reducers and listeners

use crate::subscription::SubscriptionId;
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Boxed error returned by listener callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors a reducer may report instead of producing a next state
#[derive(Debug, Error)]
pub enum ReducerError {
    #[error("invalid payload for `{kind}`: {reason}")]
    InvalidPayload { kind: String, reason: String },

    #[error("slice `{slice}` has no case reducer `{case}`")]
    UnknownCase { slice: String, case: String },

    #[error("slice `{key}` failed: {source}")]
    InSlice {
        key: String,
        #[source]
        source: Box<ReducerError>,
    },

    #[error("{0}")]
    Rejected(String),
}

impl ReducerError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

/// A single listener that failed during a notification pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    pub subscription_id: SubscriptionId,
    pub message: String,
    pub panicked: bool,
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.panicked { "panicked" } else { "failed" };
        write!(f, "listener #{} {}: {}", self.subscription_id, verb, self.message)
    }
}

impl std::error::Error for ListenerFailure {}

/// Errors returned by [`crate::Store`] operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store builder has no reducer")]
    MissingReducer,

    #[error("store builder has no initial state")]
    MissingInitialState,

    #[error("action has an empty kind")]
    MissingActionKind,

    #[error("reducers may not dispatch actions (attempted `{0}`)")]
    DispatchFromReducer(String),

    #[error("reducer failed on `{kind}`: {source}")]
    Reducer {
        kind: String,
        #[source]
        source: ReducerError,
    },

    #[error("reducer panicked on `{kind}`: {message}")]
    ReducerPanicked { kind: String, message: String },

    #[error("cannot replace the reducer while a dispatch is in progress")]
    ReplaceWhileDispatching,

    #[error("{} listener(s) failed after the state was committed", .0.len())]
    Listeners(Vec<ListenerFailure>),

    #[error("{} follow-up action(s) failed: {}", .0.len(), join_errors(.0))]
    FollowUps(Vec<StoreError>),
}

/// Errors raised while assembling a [`crate::CombinedReducer`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombineError {
    #[error("duplicate slice key `{0}`")]
    DuplicateKey(String),

    #[error("slice key must not be empty")]
    EmptyKey,
}

fn join_errors(errors: &[StoreError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Extract a readable message from a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
