//! ChangeEvent — represents a committed mutation of the contacts table.
//!
//! Emitted by `ReactiveStore` after each write so that `on_change` listeners
//! know which contact changed.

use crate::types::ContactId;

/// A change event emitted by the reactive store after any mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A contact was inserted or replaced.
    Upsert { id: ContactId },
    /// A contact was removed.
    Delete { id: ContactId },
}

impl ChangeEvent {
    /// Identity of the contact that was affected.
    pub fn id(&self) -> &ContactId {
        match self {
            Self::Upsert { id } | Self::Delete { id } => id,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }
}
