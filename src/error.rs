use thiserror::Error;

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend not initialized. Call initialize() first.")]
    NotInitialized,

    /// A backend-specific failure that has no richer representation.
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

// ---------------------------------------------------------------------------
// QueryError
// ---------------------------------------------------------------------------

/// Failure delivered through a live query. It is always the last item the
/// subscription produces.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Live query failed: {0}")]
    Failed(#[source] StorageError),
}

// ---------------------------------------------------------------------------
// ContactError — top-level rollup
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ContactError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No tokio runtime to run the query router: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}

pub type Result<T> = std::result::Result<T, ContactError>;
