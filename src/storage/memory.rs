//! MemoryBackend — a `ContactBackend` that keeps every contact in a HashMap.
//!
//! Used by tests and by sessions that do not need durability. Orders scans
//! with [`SortType::compare`], so results match the SQLite backend exactly.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::Result;
use crate::types::{Contact, ContactId, SortType};

use super::traits::ContactBackend;

/// In-memory contact table.
///
/// Interior mutability via `parking_lot::Mutex` so the backend is
/// `Send + Sync` and every method takes `&self`.
#[derive(Default)]
pub struct MemoryBackend {
    contacts: Mutex<HashMap<ContactId, Contact>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a backend pre-populated with `contacts`.
    pub fn with_contacts(contacts: impl IntoIterator<Item = Contact>) -> Self {
        let map = contacts.into_iter().map(|c| (c.id.clone(), c)).collect();
        Self {
            contacts: Mutex::new(map),
        }
    }
}

impl ContactBackend for MemoryBackend {
    fn get_raw(&self, id: &ContactId) -> Result<Option<Contact>> {
        Ok(self.contacts.lock().get(id).cloned())
    }

    fn put_raw(&self, contact: &Contact) -> Result<()> {
        self.contacts
            .lock()
            .insert(contact.id.clone(), contact.clone());
        Ok(())
    }

    fn delete_raw(&self, id: &ContactId) -> Result<bool> {
        Ok(self.contacts.lock().remove(id).is_some())
    }

    fn scan_ordered(&self, sort: SortType) -> Result<Vec<Contact>> {
        // Clone under the lock, sort after releasing it.
        let mut rows: Vec<Contact> = self.contacts.lock().values().cloned().collect();
        sort.sort(&mut rows);
        Ok(rows)
    }

    fn count_raw(&self) -> Result<usize> {
        Ok(self.contacts.lock().len())
    }
}
