//! Storage traits for contact-book.
//!
//! `ContactBackend` is the narrow raw I/O trait implemented by concrete
//! backends (SQLite, in-memory). `ContactStore` is the capability set the
//! session layer consumes: asynchronous writes plus live ordered queries.

use async_trait::async_trait;

use crate::error::Result;
use crate::reactive::live_query::LiveQuery;
use crate::types::{Contact, ContactId, SortType};

/// Low-level storage backend — one table of contacts, no notifications.
///
/// Implementors must be `Send + Sync` so they can be shared across threads.
pub trait ContactBackend: Send + Sync {
    /// Fetch a single contact by id.
    fn get_raw(&self, id: &ContactId) -> Result<Option<Contact>>;

    /// Insert `contact`, or replace the stored row with the same id.
    fn put_raw(&self, contact: &Contact) -> Result<()>;

    /// Remove the contact with `id`. Returns `false` if nothing was stored
    /// under that id.
    fn delete_raw(&self, id: &ContactId) -> Result<bool>;

    /// Every stored contact ordered by [`SortType::compare`].
    fn scan_ordered(&self, sort: SortType) -> Result<Vec<Contact>>;

    /// Number of stored contacts.
    fn count_raw(&self) -> Result<usize>;
}

/// The record store as seen by a session.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Insert or replace `contact` by identity.
    async fn upsert(&self, contact: &Contact) -> Result<()>;

    /// Delete the contact with `id`. Deleting an id that is not stored is a
    /// no-op returning `Ok(false)`.
    async fn delete(&self, id: &ContactId) -> Result<bool>;

    /// Open a live query over all contacts ordered by `sort`.
    ///
    /// The current result set is emitted immediately and again after every
    /// write that changes the table. Dropping the returned handle detaches it.
    fn observe_ordered(&self, sort: SortType) -> LiveQuery;
}
