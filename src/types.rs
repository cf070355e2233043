use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a stored contact. Assigned once, never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    /// A fresh random identity for a contact that has never been stored.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ContactId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ContactId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A contact as kept in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

impl Contact {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            id: ContactId::generate(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone_number: phone_number.into(),
        }
    }

    /// `"First Last"`, as shown in list rows.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ============================================================================
// SortType
// ============================================================================

/// Field the contact list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortType {
    #[default]
    FirstName,
    LastName,
    PhoneNumber,
}

impl SortType {
    /// Every criterion, in display order.
    pub const ALL: [SortType; 3] = [Self::FirstName, Self::LastName, Self::PhoneNumber];

    /// Column backing this criterion in the SQLite table.
    pub fn column(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::PhoneNumber => "phone_number",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::PhoneNumber => "Phone number",
        }
    }

    /// The value of this criterion's field on `contact`.
    pub fn key(self, contact: &Contact) -> &str {
        match self {
            Self::FirstName => &contact.first_name,
            Self::LastName => &contact.last_name,
            Self::PhoneNumber => &contact.phone_number,
        }
    }

    /// Ordering shared by every backend: the criterion's field ascending,
    /// ties broken by id. Bytewise, matching SQLite's `BINARY` collation.
    pub fn compare(self, a: &Contact, b: &Contact) -> Ordering {
        self.key(a)
            .cmp(self.key(b))
            .then_with(|| a.id.cmp(&b.id))
    }

    /// Sort `contacts` in place by this criterion.
    pub fn sort(self, contacts: &mut [Contact]) {
        contacts.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
