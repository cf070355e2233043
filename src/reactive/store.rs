//! ReactiveStore<B> — wraps a `ContactBackend` with live ordered queries so
//! that every open subscription receives a fresh, fully ordered result set
//! after each committed write.
//!
//! # Threading model
//!
//! `ReactiveStore<B>` is `Send + Sync`. Two independent locks are used:
//!   - `state` — the live query subscriptions (`Arc<Mutex<..>>`; cloned into
//!     unsubscribe closures).
//!   - `emitter` — the change-event emitter (its own internal lock, released
//!     before any listener runs).
//!
//! `state` is held for the whole of a flush, including the backend scans.
//! Flushes therefore run one at a time and each scans no earlier than the one
//! before it, so a subscriber never receives an older table state after a
//! newer one. Sending into a subscription channel never blocks.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::{ContactError, QueryError, Result, StorageError};
use crate::storage::traits::{ContactBackend, ContactStore};
use crate::types::{Contact, ContactId, SortType};

use super::event::ChangeEvent;
use super::event_emitter::EventEmitter;
use super::live_query::{LiveQuery, QueryEmission, Unsubscribe};

// ============================================================================
// Internal subscription types
// ============================================================================

struct QuerySub {
    id: u64,
    sort: SortType,
    tx: mpsc::UnboundedSender<QueryEmission>,
}

struct ReactiveState {
    subs: Vec<QuerySub>,
    next_id: u64,
}

impl ReactiveState {
    fn new() -> Self {
        Self {
            subs: Vec::new(),
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Unwrap the storage error from a backend failure so it can travel through
/// a live query.
fn into_storage_error(err: ContactError) -> StorageError {
    match err {
        ContactError::Storage(e) => e,
        other => StorageError::Backend(other.to_string()),
    }
}

// ============================================================================
// ReactiveStore
// ============================================================================

/// Wraps a backend with live ordered queries and change notifications.
pub struct ReactiveStore<B: ContactBackend> {
    backend: B,
    state: Arc<Mutex<ReactiveState>>,
    emitter: Arc<EventEmitter<ChangeEvent>>,
}

impl<B: ContactBackend> ReactiveStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(ReactiveState::new())),
            emitter: Arc::new(EventEmitter::new()),
        }
    }

    /// The wrapped backend. Writes made directly through it are not observed.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn get(&self, id: &ContactId) -> Result<Option<Contact>> {
        self.backend.get_raw(id)
    }

    pub fn list(&self, sort: SortType) -> Result<Vec<Contact>> {
        self.backend.scan_ordered(sort)
    }

    pub fn count(&self) -> Result<usize> {
        self.backend.count_raw()
    }

    /// Number of live queries currently attached.
    pub fn subscription_count(&self) -> usize {
        self.state.lock().subs.len()
    }

    /// Register a callback to be called on every [`ChangeEvent`].
    ///
    /// Returns an [`Unsubscribe`] closure.
    pub fn on_change(&self, callback: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> Unsubscribe {
        let listener_id = self.emitter.on(callback);
        let emitter = Arc::clone(&self.emitter);

        Box::new(move || {
            emitter.off(listener_id);
        })
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Commit-side notification: tell `on_change` listeners, then re-run
    /// every live query.
    fn notify(&self, event: ChangeEvent) {
        self.emitter.emit(&event);
        self.flush();
    }

    /// Push a fresh result set to every attached subscription.
    ///
    /// Results are scanned once per criterion. A failed scan is delivered as
    /// the subscription's final item and the subscription is dropped; so is
    /// any subscription whose receiver has gone away.
    fn flush(&self) {
        let mut st = self.state.lock();
        let mut results: HashMap<SortType, Vec<Contact>> = HashMap::new();

        st.subs.retain(|sub| {
            if sub.tx.is_closed() {
                return false;
            }
            if let Some(rows) = results.get(&sub.sort) {
                return sub.tx.send(Ok(rows.clone())).is_ok();
            }
            match self.backend.scan_ordered(sub.sort) {
                Ok(rows) => {
                    let kept = sub.tx.send(Ok(rows.clone())).is_ok();
                    results.insert(sub.sort, rows);
                    kept
                }
                Err(e) => {
                    tracing::warn!(subscription = sub.id, sort = ?sub.sort, error = %e, "live query failed");
                    let _ = sub
                        .tx
                        .send(Err(QueryError::Failed(into_storage_error(e))));
                    false
                }
            }
        });
    }
}

// ============================================================================
// ContactStore
// ============================================================================

#[async_trait]
impl<B: ContactBackend> ContactStore for ReactiveStore<B> {
    async fn upsert(&self, contact: &Contact) -> Result<()> {
        self.backend.put_raw(contact)?;
        self.notify(ChangeEvent::Upsert {
            id: contact.id.clone(),
        });
        Ok(())
    }

    async fn delete(&self, id: &ContactId) -> Result<bool> {
        let deleted = self.backend.delete_raw(id)?;
        if deleted {
            self.notify(ChangeEvent::Delete { id: id.clone() });
        }
        Ok(deleted)
    }

    fn observe_ordered(&self, sort: SortType) -> LiveQuery {
        let (tx, rx) = mpsc::unbounded_channel();

        // Register and emit the initial result under one lock acquisition so
        // no flush can slip a newer emission in ahead of it.
        let sub_id = {
            let mut st = self.state.lock();
            let id = st.next_id();
            match self.backend.scan_ordered(sort) {
                Ok(rows) => {
                    let _ = tx.send(Ok(rows));
                    st.subs.push(QuerySub { id, sort, tx });
                    tracing::debug!(subscription = id, ?sort, "live query opened");
                }
                Err(e) => {
                    tracing::warn!(subscription = id, ?sort, error = %e, "live query failed on open");
                    let _ = tx.send(Err(QueryError::Failed(into_storage_error(e))));
                }
            }
            id
        };

        let state_arc = Arc::clone(&self.state);
        LiveQuery::new(
            sort,
            rx,
            Box::new(move || {
                let mut st = state_arc.lock();
                let before = st.subs.len();
                st.subs.retain(|s| s.id != sub_id);
                if st.subs.len() != before {
                    tracing::debug!(subscription = sub_id, "live query closed");
                }
            }),
        )
    }
}
