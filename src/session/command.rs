//! ContactEvent — every user intent the presentation layer can raise.

use serde::{Deserialize, Serialize};

use crate::types::{ContactId, SortType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ContactEvent {
    /// Store the draft as a new contact, if every field is filled in.
    SaveContact,
    SetFirstName(String),
    SetLastName(String),
    SetPhoneNumber(String),
    ShowEntryForm,
    /// Dismiss the entry form. The typed field values are discarded, so the
    /// next `ShowEntryForm` opens an empty form.
    HideEntryForm,
    ChangeSort(SortType),
    DeleteContact(ContactId),
}
