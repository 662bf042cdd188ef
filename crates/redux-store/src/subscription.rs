//! Subscriber registry
//!
//! Listeners are kept in insertion order under monotonically increasing ids.
//! A notification pass works on a [`Registry::snapshot`] taken when the pass
//! starts, and re-checks [`Registry::contains`] before each call so listeners
//! removed mid-pass are skipped.

use crate::error::BoxError;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

pub type SubscriptionId = u64;

/// Callback notified after every committed state change
///
/// Implemented for every `Fn() -> Result<(), BoxError>` closure that can be
/// shared between threads.
pub trait Listener: Fn() -> Result<(), BoxError> + Send + Sync {}

impl<F> Listener for F where F: Fn() -> Result<(), BoxError> + Send + Sync {}

#[derive(Default)]
pub(crate) struct Registry {
    inner: Mutex<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: SubscriptionId,
    listeners: BTreeMap<SubscriptionId, Arc<dyn Listener>>,
}

impl Registry {
    pub(crate) fn insert(&self, listener: Arc<dyn Listener>) -> SubscriptionId {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, listener);
        id
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        self.inner.lock().listeners.remove(&id).is_some()
    }

    pub(crate) fn contains(&self, id: SubscriptionId) -> bool {
        self.inner.lock().listeners.contains_key(&id)
    }

    pub(crate) fn snapshot(&self) -> Vec<(SubscriptionId, Arc<dyn Listener>)> {
        self.inner
            .lock()
            .listeners
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect()
    }

    pub(crate) fn clear(&self) -> usize {
        let mut inner = self.inner.lock();
        let removed = inner.listeners.len();
        inner.listeners.clear();
        removed
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

/// Handle returned by [`crate::Store::subscribe`]
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Debug, Clone)]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<Registry>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, registry: &Arc<Registry>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the listener from future notifications
    ///
    /// Returns `true` only for the call that actually removed it; repeated
    /// calls, or calls after the store is gone, are no-ops.
    pub fn unsubscribe(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => {
                let removed = registry.remove(self.id);
                if removed {
                    log::debug!("Listener #{} unsubscribed", self.id);
                }
                removed
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(self.id))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("len", &self.len()).finish()
    }
}
