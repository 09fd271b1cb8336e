//! Shared key/value storage.
//!
//! Values written here are visible to every planner view opened over the
//! same backing store; views converge by polling rather than by push.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub trait SharedStorage {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn store(&self, key: &str, value: &str) -> Result<()>;
}

/// Storage over the `shared_storage` table.
pub struct SqliteStorage<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStorage<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl SharedStorage for SqliteStorage<'_> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM shared_storage WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read shared key {}", key))
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO shared_storage (key, value, updated_at)
                 VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                params![key, value],
            )
            .with_context(|| format!("Failed to write shared key {}", key))?;
        Ok(())
    }
}

/// In-process storage. Clones share one map, standing in for two views of
/// the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SharedStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
