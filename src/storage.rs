//! Storage layer: durable key/value slots holding store snapshots.

use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Storage directory name.
pub const STORE_DIR: &str = ".todos";

/// SQLite database file.
const DB_FILE: &str = "todos.db";

/// A durable string slot per key. Writes replace the whole value.
pub trait Storage {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Which storage implementation backs a store directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Sqlite,
    File,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Sqlite => f.write_str("sqlite"),
            Backend::File => f.write_str("file"),
        }
    }
}

/// Returned when a backend name is not `sqlite` or `file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendParseError(pub String);

impl fmt::Display for BackendParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown backend '{}' (expected sqlite or file)", self.0)
    }
}

impl std::error::Error for BackendParseError {}

impl FromStr for Backend {
    type Err = BackendParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sqlite" => Ok(Backend::Sqlite),
            "file" => Ok(Backend::File),
            other => Err(BackendParseError(other.to_string())),
        }
    }
}

/// Create the store directory under `root` and open the chosen backend.
pub fn init_backend(root: &Path, backend: Backend) -> Result<Box<dyn Storage>> {
    let dir = root.join(STORE_DIR);
    fs::create_dir_all(&dir).context("Failed to create .todos directory")?;
    open_in(&dir, backend)
}

/// Open the chosen backend in an existing store directory.
pub fn open_backend(root: &Path, backend: Backend) -> Result<Box<dyn Storage>> {
    let dir = root.join(STORE_DIR);
    if !dir.exists() {
        eyre::bail!("No .todos directory found. Run 'td init' first.");
    }
    open_in(&dir, backend)
}

fn open_in(dir: &Path, backend: Backend) -> Result<Box<dyn Storage>> {
    log::debug!("Opening {} storage in {}", backend, dir.display());
    let storage: Box<dyn Storage> = match backend {
        Backend::Sqlite => Box::new(SqliteStorage::open(&dir.join(DB_FILE))?),
        Backend::File => Box::new(FileStorage::new(dir)),
    };
    Ok(storage)
}

/// Slots kept in a single SQLite table.
pub struct SqliteStorage {
    db: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Connection::open(path).context("Failed to open SQLite database")?;
        let storage = Self { db };
        storage.init_schema()?;
        Ok(storage)
    }

    /// A database that lives only as long as this handle.
    pub fn in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let storage = Self { db };
        storage.init_schema()?;
        Ok(storage)
    }

    fn init_schema(&self) -> Result<()> {
        self.db
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS slots (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
            "#,
            )
            .context("Failed to initialize schema")?;

        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .query_row("SELECT value FROM slots WHERE key = ?", params![key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read slot '{}'", key))?;

        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.db
            .execute(
                "INSERT OR REPLACE INTO slots (key, value) VALUES (?, ?)",
                params![key, value],
            )
            .with_context(|| format!("Failed to write slot '{}'", key))?;

        Ok(())
    }
}

/// Slots kept as `<key>.json` files in one directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            eyre::bail!("invalid slot key '{}'", key);
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        let tmp_path = path.with_extension("json.tmp");

        let mut file = File::create(&tmp_path).with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        file.write_all(value.as_bytes())
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to sync {}", tmp_path.display()))?;

        fs::rename(&tmp_path, &path).with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }
}

/// Slots held in process memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
