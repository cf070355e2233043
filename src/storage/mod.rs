pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;
