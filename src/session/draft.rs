//! Draft entry buffer — the unsaved contact being typed into the entry form.

use serde::{Deserialize, Serialize};

use crate::types::Contact;

/// Unsaved contact fields plus the entry form's visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftEntry {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub is_visible: bool,
}

impl DraftEntry {
    pub fn set_first_name(&mut self, value: impl Into<String>) {
        self.first_name = value.into();
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) {
        self.last_name = value.into();
    }

    pub fn set_phone_number(&mut self, value: impl Into<String>) {
        self.phone_number = value.into();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.is_visible = visible;
    }

    /// Back to empty fields and a hidden form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True when no text field is empty or whitespace-only.
    pub fn is_complete(&self) -> bool {
        [&self.first_name, &self.last_name, &self.phone_number]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// A new contact with a fresh id, or `None` while any field is blank.
    ///
    /// Field values are taken as typed; surrounding whitespace is kept.
    pub fn to_contact(&self) -> Option<Contact> {
        self.is_complete().then(|| {
            Contact::new(
                self.first_name.clone(),
                self.last_name.clone(),
                self.phone_number.clone(),
            )
        })
    }
}
