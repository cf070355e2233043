//! EventEmitter<T> — typed synchronous pub/sub for store change events.
//!
//! Listeners are stored as `Arc<dyn Fn(&T)>` so the list can be snapshotted
//! before dispatch:
//!   - A listener removed *during* emission is still called in that round.
//!   - A listener added *during* emission is NOT called until the next emit.
//!
//! A panicking listener is caught and logged; the remaining listeners of
//! the round still run.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Handle returned by [`EventEmitter::on`], accepted by [`EventEmitter::off`].
pub type ListenerId = u64;

/// Closure type for event listeners.
pub type ListenerFn<T> = dyn Fn(&T) + Send + Sync;

/// Typed synchronous event emitter. The internal lock is never held while a
/// listener runs, so listeners may call `on`/`off` re-entrantly.
pub struct EventEmitter<T> {
    listeners: Mutex<Vec<(ListenerId, Arc<ListenerFn<T>>)>>,
    next_id: AtomicU64,
}

impl<T> EventEmitter<T> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `callback` and return its [`ListenerId`].
    pub fn on(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove the listener identified by `id`. Returns whether it was present.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Deliver `event` to every listener registered when the call began.
    ///
    /// Returns the number of listeners that completed without panicking.
    pub fn emit(&self, event: &T) -> usize {
        let snapshot: Vec<(ListenerId, Arc<ListenerFn<T>>)> = self
            .listeners
            .lock()
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect();

        let mut delivered = 0;
        for (id, cb) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| cb(event))) {
                Ok(()) => delivered += 1,
                Err(_) => tracing::warn!(listener = id, "change listener panicked"),
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }
}

impl<T> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}
