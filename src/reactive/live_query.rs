//! LiveQuery — the receiving half of an ordered contacts subscription.
//!
//! The store pushes a full ordered result set into the channel on open and
//! after every mutating write. Dropping the handle runs its unsubscribe
//! closure, which detaches it from the store; anything already queued in the
//! channel is discarded with it.

use tokio::sync::mpsc;

use crate::error::QueryError;
use crate::types::{Contact, SortType};

/// One emission of a live query.
pub type QueryEmission = std::result::Result<Vec<Contact>, QueryError>;

/// An owned one-shot closure that removes a subscription when called.
pub type Unsubscribe = Box<dyn FnOnce() + Send + Sync>;

/// Owned handle to a live ordered query.
pub struct LiveQuery {
    sort: SortType,
    rx: mpsc::UnboundedReceiver<QueryEmission>,
    unsubscribe: Option<Unsubscribe>,
}

impl LiveQuery {
    /// Build a handle from a receiver and the closure that detaches it.
    pub fn new(
        sort: SortType,
        rx: mpsc::UnboundedReceiver<QueryEmission>,
        unsubscribe: Unsubscribe,
    ) -> Self {
        Self {
            sort,
            rx,
            unsubscribe: Some(unsubscribe),
        }
    }

    /// Criterion this query orders by.
    pub fn sort(&self) -> SortType {
        self.sort
    }

    /// Wait for the next emission.
    ///
    /// Returns `None` once the store side has gone away; an `Err` item is
    /// the last item the query produces.
    pub async fn next(&mut self) -> Option<QueryEmission> {
        self.rx.recv().await
    }

    /// Take an emission if one is already queued.
    pub fn try_next(&mut self) -> Option<QueryEmission> {
        self.rx.try_recv().ok()
    }
}

impl Drop for LiveQuery {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for LiveQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveQuery")
            .field("sort", &self.sort)
            .field("attached", &self.unsubscribe.is_some())
            .finish()
    }
}
