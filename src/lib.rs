pub mod config;
pub mod error;
pub mod types;

pub mod reactive;
pub mod session;
pub mod storage;
pub mod view;

pub use config::SessionConfig;
pub use error::{ContactError, Result};
pub use session::{ContactEvent, ContactSession, Snapshot, SnapshotStream};
pub use types::{Contact, ContactId, SortType};
