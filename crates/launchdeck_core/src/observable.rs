//! Replay-latest observable values.
//!
//! # Responsibility
//! - Hold one current value and a registry of callback observers.
//! - Push every replacement to all current observers, in registration order.
//! - Replay the current value to each new observer at subscription time.
//!
//! # Invariants
//! - `version` increments exactly once per publication.
//! - Values sharing a `PublishGate` never notify concurrently; a subscription
//!   replay cannot interleave with a publication on the same gate.
//! - Only the owning crate may publish; external callers read and subscribe.
//! - Dropping a `Subscription` removes its observer before the next
//!   notification cycle.
//!
//! A panicking observer is logged and skipped; the remaining observers are
//! still notified and the publishing caller carries on.
//!
//! Observer callbacks run while the gate is held. They may read values and
//! drop subscriptions, but must not publish or subscribe on the same gate.

use crate::logging::describe_panic;
use log::warn;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Observer<V> = Arc<dyn Fn(&V) + Send + Sync>;

/// Serializes notifications across every value that shares it.
#[derive(Debug, Default)]
pub(crate) struct PublishGate {
    lock: Mutex<()>,
}

impl PublishGate {
    fn enter(&self) -> MutexGuard<'_, ()> {
        // A panicking observer poisons the gate; the guarded data is `()`.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct State<V> {
    value: Arc<V>,
    version: u64,
    next_observer_id: u64,
    observers: BTreeMap<u64, Observer<V>>,
}

struct Shared<V> {
    gate: Arc<PublishGate>,
    state: Mutex<State<V>>,
}

impl<V> Shared<V> {
    fn lock_state(&self) -> MutexGuard<'_, State<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Live, replay-latest value handle.
///
/// Cloning yields another handle to the same value and observer registry.
pub struct ObservableValue<V> {
    shared: Arc<Shared<V>>,
}

impl<V> Clone for ObservableValue<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<V: Debug> Debug for ObservableValue<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock_state();
        f.debug_struct("ObservableValue")
            .field("value", &state.value)
            .field("version", &state.version)
            .field("observers", &state.observers.len())
            .finish()
    }
}

impl<V: Send + Sync + 'static> ObservableValue<V> {
    /// Creates a value whose notifications are serialized with every other
    /// value sharing `gate`.
    pub(crate) fn with_gate(initial: V, gate: Arc<PublishGate>) -> Self {
        Self {
            shared: Arc::new(Shared {
                gate,
                state: Mutex::new(State {
                    value: Arc::new(initial),
                    version: 0,
                    next_observer_id: 0,
                    observers: BTreeMap::new(),
                }),
            }),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> V
    where
        V: Clone,
    {
        (*self.snapshot()).clone()
    }

    /// Returns a shared, read-only handle to the current value.
    pub fn snapshot(&self) -> Arc<V> {
        Arc::clone(&self.shared.lock_state().value)
    }

    /// Number of publications since construction.
    pub fn version(&self) -> u64 {
        self.shared.lock_state().version
    }

    pub fn observer_count(&self) -> usize {
        self.shared.lock_state().observers.len()
    }

    /// Registers `observer` and immediately replays the current value to it.
    ///
    /// The observer then receives every subsequent publication until the
    /// returned `Subscription` is dropped or unsubscribed.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&V) + Send + Sync + 'static,
    {
        let _gate = self.shared.gate.enter();
        let observer: Observer<V> = Arc::new(observer);

        let (observer_id, current) = {
            let mut state = self.shared.lock_state();
            let observer_id = state.next_observer_id;
            state.next_observer_id += 1;
            state.observers.insert(observer_id, Arc::clone(&observer));
            (observer_id, Arc::clone(&state.value))
        };

        notify(&observer, &current);

        let registry = Arc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = registry.upgrade() {
                shared.lock_state().observers.remove(&observer_id);
            }
        })
    }

    /// Replaces the value and notifies all observers.
    pub(crate) fn set(&self, value: V) {
        let _gate = self.shared.gate.enter();
        self.publish(value);
    }

    /// Publishes `f(current)` when it returns `Some`; otherwise leaves the
    /// value and version untouched.
    ///
    /// Returns whether a publication happened.
    pub(crate) fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&V) -> Option<V>,
    {
        let _gate = self.shared.gate.enter();
        let current = Arc::clone(&self.shared.lock_state().value);
        match f(&*current) {
            Some(next) => {
                self.publish(next);
                true
            }
            None => false,
        }
    }

    /// Atomically publishes `new` only if the current value equals `expected`.
    pub(crate) fn compare_and_set(&self, expected: &V, new: V) -> bool
    where
        V: PartialEq,
    {
        self.update(|current| (current == expected).then_some(new))
    }

    // Caller must hold the gate.
    fn publish(&self, value: V) {
        let (value, observers) = {
            let mut state = self.shared.lock_state();
            state.value = Arc::new(value);
            state.version += 1;
            let observers: Vec<Observer<V>> = state.observers.values().cloned().collect();
            (Arc::clone(&state.value), observers)
        };

        for observer in &observers {
            notify(observer, &value);
        }
    }
}

fn notify<V>(observer: &Observer<V>, value: &V) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| observer(value))) {
        warn!(
            "event=observer_panic module=observable status=error payload={}",
            describe_panic(&*payload)
        );
    }
}

/// RAII guard for one registered observer.
#[must_use = "dropping a Subscription unsubscribes the observer"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Removes the observer now.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
