//! Headless presentation model.
//!
//! [`ScreenModel::from_snapshot`] turns a [`Snapshot`] into everything a
//! renderer needs for the contacts screen: the sort picker, one row per
//! contact and the add-contact dialog, each element carrying the
//! [`ContactEvent`] it raises. Rendering itself is left to the caller.

use crate::session::{ContactEvent, Snapshot};
use crate::types::{ContactId, SortType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenModel {
    pub sort_options: Vec<SortOption>,
    pub rows: Vec<ContactRow>,
    pub dialog: Option<EntryDialog>,
    /// Raised by the floating "add contact" button.
    pub on_add: ContactEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOption {
    pub sort: SortType,
    pub label: &'static str,
    pub selected: bool,
    pub on_select: ContactEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub id: ContactId,
    pub title: String,
    pub subtitle: String,
    pub on_delete: ContactEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDialog {
    pub title: &'static str,
    pub fields: [EntryField; 3],
    pub on_save: ContactEvent,
    pub on_dismiss: ContactEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    FirstName,
    LastName,
    PhoneNumber,
}

impl DraftField {
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::PhoneNumber => "Phone Number",
        }
    }

    /// The event that replaces this field with `value`.
    pub fn edit(self, value: impl Into<String>) -> ContactEvent {
        let value = value.into();
        match self {
            Self::FirstName => ContactEvent::SetFirstName(value),
            Self::LastName => ContactEvent::SetLastName(value),
            Self::PhoneNumber => ContactEvent::SetPhoneNumber(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryField {
    pub field: DraftField,
    pub placeholder: &'static str,
    pub value: String,
}

impl ScreenModel {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let sort_options = SortType::ALL
            .into_iter()
            .map(|sort| SortOption {
                sort,
                label: sort.label(),
                selected: sort == snapshot.sort,
                on_select: ContactEvent::ChangeSort(sort),
            })
            .collect();

        let rows = snapshot
            .contacts
            .iter()
            .map(|contact| ContactRow {
                id: contact.id.clone(),
                title: contact.display_name(),
                subtitle: contact.phone_number.clone(),
                on_delete: ContactEvent::DeleteContact(contact.id.clone()),
            })
            .collect();

        let dialog = snapshot.is_adding_contact().then(|| {
            let draft = &snapshot.draft;
            let field = |field: DraftField, value: &str| EntryField {
                field,
                placeholder: field.placeholder(),
                value: value.to_string(),
            };
            EntryDialog {
                title: "Add contact",
                fields: [
                    field(DraftField::FirstName, &draft.first_name),
                    field(DraftField::LastName, &draft.last_name),
                    field(DraftField::PhoneNumber, &draft.phone_number),
                ],
                on_save: ContactEvent::SaveContact,
                on_dismiss: ContactEvent::HideEntryForm,
            }
        });

        Self {
            sort_options,
            rows,
            dialog,
            on_add: ContactEvent::ShowEntryForm,
        }
    }
}
