//! Session log persistence.
//!
//! [`LogStore`] is the seam the log manager depends on. [`SqliteLogStore`]
//! implements it over an embedded SQLite file.

mod sqlite;

pub use sqlite::{DEFAULT_DATABASE_FILE, SqliteLogStore};

use crate::error::StoreError;
use crate::session::SessionRecord;

/// Append, query and erase session log rows.
///
/// Failures propagate to the caller. Nothing is retried.
pub trait LogStore: Send + Sync {
    /// Every logged session, newest first.
    fn fetch_all(&self) -> Result<Vec<SessionRecord>, StoreError>;

    /// Delete every logged session, returning how many were removed.
    fn erase_all(&self) -> Result<usize, StoreError>;

    /// Log one session, returning the number of rows written.
    fn append(&self, record: &SessionRecord) -> Result<usize, StoreError>;
}

impl<S: LogStore + ?Sized> LogStore for std::sync::Arc<S> {
    fn fetch_all(&self) -> Result<Vec<SessionRecord>, StoreError> {
        (**self).fetch_all()
    }

    fn erase_all(&self) -> Result<usize, StoreError> {
        (**self).erase_all()
    }

    fn append(&self, record: &SessionRecord) -> Result<usize, StoreError> {
        (**self).append(record)
    }
}
