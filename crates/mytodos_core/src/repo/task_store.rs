//! Task persistence contract and SQLite key-value implementation.
//!
//! # Responsibility
//! - Load the persisted task list once at startup.
//! - Replace the persisted task list after each mutation.
//!
//! # Invariants
//! - The whole collection is stored as one JSON document under `todos`,
//!   in collection order.
//! - A missing slot loads as `None`, not as an empty list.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::task::Task;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key under which the task list is stored.
pub const TASKS_KEY: &str = "todos";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialization(serde_json::Error),
    /// Connection was not migrated to the schema this build expects.
    SchemaNotReady { found: u32, expected: u32 },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid stored task data: {err}"),
            Self::SchemaNotReady { found, expected } => write!(
                f,
                "store schema version {found} does not match expected {expected}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::SchemaNotReady { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Persistence surface consumed by the lifecycle controller.
pub trait TaskStore {
    fn load_tasks(&self) -> StoreResult<Option<Vec<Task>>>;
    fn save_tasks(&self, tasks: &[Task]) -> StoreResult<()>;
}

/// SQLite-backed store using the `kv_store` table.
pub struct SqliteTaskStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskStore<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    ///
    /// # Errors
    /// - `StoreError::SchemaNotReady` when migrations were not applied.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let found = current_user_version(conn)?;
        let expected = latest_version();
        if found != expected {
            return Err(StoreError::SchemaNotReady { found, expected });
        }
        Ok(Self { conn })
    }
}

impl TaskStore for SqliteTaskStore<'_> {
    fn load_tasks(&self) -> StoreResult<Option<Vec<Task>>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [TASKS_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => {
                let tasks: Vec<Task> = serde_json::from_str(&json)?;
                debug!(
                    "event=store_load module=repo status=ok count={}",
                    tasks.len()
                );
                Ok(Some(tasks))
            }
            None => Ok(None),
        }
    }

    fn save_tasks(&self, tasks: &[Task]) -> StoreResult<()> {
        let json = serde_json::to_string(tasks)?;
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![TASKS_KEY, json],
        )?;
        debug!(
            "event=store_save module=repo status=ok count={}",
            tasks.len()
        );
        Ok(())
    }
}
