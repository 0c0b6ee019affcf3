//! Listener bookkeeping for viewport implementations.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{EventKind, Listener, MapEvent, ViewportError};

/// Per-viewport registry of event listeners.
///
/// Listeners are matched by `Arc` pointer identity. Registering the same
/// listener twice stores it twice; `remove` drops one occurrence.
///
/// Emission works on a copy of the listener list taken before the first
/// handler runs, so handlers may freely add or remove listeners (on this
/// registry or any other) without deadlocking. Changes made during an
/// emission take effect from the next emission on.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<HashMap<EventKind, Vec<Listener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn add(&self, kind: EventKind, listener: &Listener) {
        self.listeners
            .lock()
            .entry(kind)
            .or_default()
            .push(Arc::clone(listener));
    }

    /// Remove one occurrence of a listener.
    ///
    /// Returns `false` if the listener was not registered.
    pub fn remove(&self, kind: EventKind, listener: &Listener) -> bool {
        let mut listeners = self.listeners.lock();
        let Some(list) = listeners.get_mut(&kind) else {
            return false;
        };
        match list.iter().position(|l| Arc::ptr_eq(l, listener)) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of listeners registered for an event kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.listeners.lock().get(&kind).map_or(0, Vec::len)
    }

    /// Total number of registered listeners across all kinds.
    pub fn total(&self) -> usize {
        self.listeners.lock().values().map(Vec::len).sum()
    }

    /// Whether this exact listener is registered for an event kind.
    pub fn contains(&self, kind: EventKind, listener: &Listener) -> bool {
        self.listeners
            .lock()
            .get(&kind)
            .is_some_and(|list| list.iter().any(|l| Arc::ptr_eq(l, listener)))
    }

    /// Deliver an event to every listener registered for its kind.
    ///
    /// Stops at the first handler error and returns it.
    pub fn emit(&self, event: &MapEvent) -> Result<(), ViewportError> {
        let snapshot: Vec<Listener> = self
            .listeners
            .lock()
            .get(&event.kind)
            .cloned()
            .unwrap_or_default();

        for listener in snapshot {
            listener(event)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.lock();
        let counts: HashMap<EventKind, usize> =
            listeners.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("ListenerRegistry")
            .field("listeners", &counts)
            .finish()
    }
}
