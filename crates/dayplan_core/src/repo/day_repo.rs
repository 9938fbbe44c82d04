//! Day list repository contracts and implementations.
//!
//! # Responsibility
//! - Load and save the complete day list as one blob.
//! - Keep SQL and codec details inside the persistence boundary.
//!
//! # Invariants
//! - `save_days` either stores the whole list or leaves the previous blob
//!   untouched.
//! - A missing blob loads as an empty day book, never as an error.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::day_book::DayBook;
use crate::model::day_record::DayRecord;
use crate::repo::codec::{decode_days, encode_days, CodecError, TASKS_STORAGE_KEY};
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for day list persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Codec(CodecError),
    /// Backend refused the operation (used by non-SQLite backends).
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "day storage unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<CodecError> for RepoError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Whole-list persistence for day records.
pub trait DayRepository {
    fn load_days(&self) -> RepoResult<DayBook>;
    fn save_days(&mut self, days: &[DayRecord]) -> RepoResult<()>;
}

/// SQLite-backed repository storing the blob in `kv_store`.
pub struct SqliteDayRepository {
    conn: Connection,
    key: String,
}

impl SqliteDayRepository {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self::with_key(conn, TASKS_STORAGE_KEY)
    }

    /// Wraps a connection and stores the blob under a custom key.
    pub fn with_key(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl DayRepository for SqliteDayRepository {
    fn load_days(&self) -> RepoResult<DayBook> {
        let blob: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match blob {
            Some(bytes) => {
                let book = decode_days(&bytes).map_err(|err| {
                    error!(
                        "event=days_load module=repo status=error error_code=blob_decode_failed error={}",
                        err
                    );
                    err
                })?;
                debug!(
                    "event=days_load module=repo status=ok days={} bytes={}",
                    book.len(),
                    bytes.len()
                );
                Ok(book)
            }
            None => {
                debug!("event=days_load module=repo status=ok days=0 blob=absent");
                Ok(DayBook::new())
            }
        }
    }

    fn save_days(&mut self, days: &[DayRecord]) -> RepoResult<()> {
        let blob = encode_days(days)?;
        let result = self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), blob],
        );

        match result {
            Ok(_) => {
                debug!(
                    "event=days_save module=repo status=ok days={} bytes={}",
                    days.len(),
                    blob.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=days_save module=repo status=error error_code=blob_write_failed error={}",
                    err
                );
                Err(err.into())
            }
        }
    }
}

/// Process-local repository holding the encoded blob in memory.
///
/// Writes go through the same codec as SQLite, so it exercises the exact
/// persisted shape. `set_fail_writes(true)` makes every save fail, which
/// lets callers observe store behavior on storage errors.
#[derive(Debug, Default)]
pub struct MemoryDayRepository {
    blob: Option<Vec<u8>>,
    fail_writes: bool,
    save_count: usize,
}

impl MemoryDayRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given days already persisted.
    pub fn with_days(days: &[DayRecord]) -> RepoResult<Self> {
        Ok(Self {
            blob: Some(encode_days(days)?),
            ..Self::default()
        })
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    pub fn blob(&self) -> Option<&[u8]> {
        self.blob.as_deref()
    }
}

impl DayRepository for MemoryDayRepository {
    fn load_days(&self) -> RepoResult<DayBook> {
        match &self.blob {
            Some(bytes) => Ok(decode_days(bytes)?),
            None => Ok(DayBook::new()),
        }
    }

    fn save_days(&mut self, days: &[DayRecord]) -> RepoResult<()> {
        if self.fail_writes {
            return Err(RepoError::Unavailable("writes disabled".to_string()));
        }
        self.blob = Some(encode_days(days)?);
        self.save_count += 1;
        Ok(())
    }
}
