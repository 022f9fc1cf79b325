use std::{fs, path::Path};

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::warn;

use super::KeyValueStore;

/// Sqlite-backed key-value store. A single `kv` table holds every persisted
/// value; `:memory:` is supported for tests.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();

        if path_ref != Path::new(":memory:")
            && let Some(parent) = path_ref.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "failed to create parent directories for {}",
                    path_ref.display()
                )
            })?;
        }

        let conn = Connection::open(path_ref)
            .with_context(|| format!("failed to open store at {}", path_ref.display()))?;

        conn.execute_batch("CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
            .context("failed to create kv table")?;

        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Option<String> {
        let result = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional();

        match result {
            Ok(value) => value,
            Err(error) => {
                warn!(key, %error, "failed to read key, treating as absent");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .with_context(|| format!("failed to write key '{key}'"))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .with_context(|| format!("failed to remove key '{key}'"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::keys;

    #[test]
    fn open_in_memory() {
        let store = SqliteStore::open(":memory:").expect("store should open");
        assert_eq!(store.get(keys::TASKS), None);
    }

    #[test]
    fn set_get_remove_round_trip() {
        let mut store = SqliteStore::open(":memory:").expect("store should open");

        store
            .set(keys::ACTIVE_TAB, "tab-tasks")
            .expect("set should succeed");
        assert_eq!(store.get(keys::ACTIVE_TAB), Some("tab-tasks".to_string()));

        store
            .set(keys::ACTIVE_TAB, "tab-settings")
            .expect("overwrite should succeed");
        assert_eq!(
            store.get(keys::ACTIVE_TAB),
            Some("tab-settings".to_string())
        );

        store.remove(keys::ACTIVE_TAB).expect("remove should succeed");
        assert_eq!(store.get(keys::ACTIVE_TAB), None);
    }

    #[test]
    fn empty_value_round_trips() {
        let mut store = SqliteStore::open(":memory:").expect("store should open");
        store.set(keys::TASKS, "").expect("set should succeed");
        assert_eq!(store.get(keys::TASKS), Some(String::new()));
    }

    #[test]
    fn open_creates_parent_directories() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let path = temp.path().join("nested").join("state").join("dash.db");

        let mut store = SqliteStore::open(&path).expect("store should open");
        store.set("k", "v").expect("set should succeed");

        assert!(path.exists());
    }

    #[test]
    fn values_survive_reopen() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let path = temp.path().join("dash.db");

        {
            let mut store = SqliteStore::open(&path).expect("store should open");
            store.set(keys::THEME, "dark").expect("set should succeed");
        }

        let reopened = SqliteStore::open(&path).expect("store should reopen");
        assert_eq!(reopened.get(keys::THEME), Some("dark".to_string()));
    }
}
