//! SQLite-backed session log.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{Connection, Row, params};

use super::LogStore;
use crate::error::StoreError;
use crate::session::SessionRecord;

/// File name of the session log when settings do not override it.
pub const DEFAULT_DATABASE_FILE: &str = "LocalLog.sdb";

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS Session (
        SessionId TEXT NOT NULL,
        UserName TEXT NOT NULL,
        Role TEXT NOT NULL,
        Verified TEXT NOT NULL,
        IpAddress TEXT NOT NULL,
        UserAgent TEXT NOT NULL,
        City TEXT NOT NULL,
        State TEXT NOT NULL,
        CountryCode TEXT NOT NULL,
        CreatedOn TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_session_created ON Session(CreatedOn DESC);
"#;

enum Target {
    /// Opened per operation and closed when it returns.
    File(PathBuf),
    /// One shared connection, for tests and throwaway runs.
    Memory(Mutex<Connection>),
}

/// Session log kept in a SQLite database.
///
/// File-backed stores open a connection for each operation, so the
/// connection is released on every exit path, errors included.
pub struct SqliteLogStore {
    target: Target,
}

impl std::fmt::Debug for SqliteLogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.target {
            Target::File(path) => f.debug_tuple("SqliteLogStore").field(path).finish(),
            Target::Memory(_) => f.write_str("SqliteLogStore(:memory:)"),
        }
    }
}

impl SqliteLogStore {
    /// Use the database at `path`, creating it and its schema if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            target: Target::File(path.into()),
        };
        store.with_connection(|_| Ok(()))?;
        Ok(store)
    }

    /// A private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            target: Target::Memory(Mutex::new(conn)),
        })
    }

    /// Database path, or `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            Target::File(path) => Some(path),
            Target::Memory(_) => None,
        }
    }

    fn with_connection<R>(
        &self,
        op: impl FnOnce(&Connection) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        match &self.target {
            Target::File(path) => {
                let conn = Connection::open(path).map_err(|source| StoreError::Open {
                    path: path.clone(),
                    source,
                })?;
                init_schema(&conn)?;
                op(&conn)
            }
            Target::Memory(conn) => op(&conn.lock()),
        }
    }
}

fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    let verified: String = row.get(3)?;
    Ok(SessionRecord {
        session_id: row.get(0)?,
        user_name: row.get(1)?,
        role: row.get(2)?,
        verified: verified.trim().eq_ignore_ascii_case("true"),
        ip_address: row.get(4)?,
        user_agent: row.get(5)?,
        city: row.get(6)?,
        state: row.get(7)?,
        country_code: row.get(8)?,
        created_on: row.get(9)?,
    })
}

impl LogStore for SqliteLogStore {
    #[tracing::instrument(skip(self), target = "trellis::store", level = "debug", err)]
    fn fetch_all(&self) -> Result<Vec<SessionRecord>, StoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT SessionId, UserName, Role, Verified, IpAddress, UserAgent,
                       City, State, CountryCode, CreatedOn
                FROM Session
                ORDER BY CreatedOn DESC, rowid DESC
                "#,
            )?;
            let records = stmt
                .query_map([], record_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            tracing::debug!(target: "trellis::store", count = records.len(), "fetched session log");
            Ok(records)
        })
    }

    #[tracing::instrument(skip(self), target = "trellis::store", level = "debug", err)]
    fn erase_all(&self) -> Result<usize, StoreError> {
        self.with_connection(|conn| {
            let removed = conn.execute("DELETE FROM Session", [])?;
            tracing::info!(target: "trellis::store", removed, "erased session log");
            Ok(removed)
        })
    }

    #[tracing::instrument(
        skip_all,
        target = "trellis::store",
        level = "debug",
        fields(session_id = %record.session_id),
        err
    )]
    fn append(&self, record: &SessionRecord) -> Result<usize, StoreError> {
        self.with_connection(|conn| {
            let written = conn.execute(
                r#"
                INSERT INTO Session (
                    SessionId, UserName, Role, Verified, IpAddress, UserAgent,
                    City, State, CountryCode, CreatedOn
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    record.session_id,
                    record.user_name,
                    record.role,
                    record.verified.to_string(),
                    record.ip_address,
                    record.user_agent,
                    record.city,
                    record.state,
                    record.country_code,
                    record.created_on,
                ],
            )?;
            Ok(written)
        })
    }
}

static_assertions::assert_impl_all!(SqliteLogStore: Send, Sync);
