//! Persistent string key-value storage. Every stateful controller reads and
//! writes its slice of state through [`KeyValueStore`]; stored values are
//! opaque serialized text owned by the writing controller.

pub mod sqlite;

pub use sqlite::SqliteStore;

use std::collections::HashMap;

use anyhow::Result;

/// The four keys below are the entire persisted-state contract.
pub mod keys {
    /// Plain tab id string.
    pub const ACTIVE_TAB: &str = "dash.activeTab";
    /// JSON array of tasks.
    pub const TASKS: &str = "dash.tasks";
    /// "light" or "dark".
    pub const THEME: &str = "dash.theme";
    /// JSON settings record.
    pub const SETTINGS: &str = "dash.settings";
}

/// String-keyed persistent store. `get` never fails on a missing key; a
/// failing `set` or `remove` is recoverable and callers continue with
/// in-memory state only.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// HashMap-backed store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
