//! Persistent key-value store for credentials and auto-clock preferences.
//!
//! Values live in a single JSON object on disk (`store.json` in the data
//! directory). Every key belongs to a fixed schema, see [`StoreKey`], and
//! reading a key that was never written yields that key's default. Writes are
//! read-modify-write of the latest file contents, so the last write to a key
//! wins and writes to different keys keep each other's values.
//!
//! ```rust,no_run
//! use keka_clicker::libs::storage::{Store, StoreKey};
//!
//! let store = Store::new()?;
//! store.set_string(StoreKey::Subdomain, "acme")?;
//! assert_eq!(store.get_string(StoreKey::Subdomain)?, "acme");
//! # Ok::<(), keka_clicker::libs::error::KekaError>(())
//! ```

use super::data_storage::DataStorage;
use super::error::{KekaError, KekaResult};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const STORE_FILE_NAME: &str = "store.json";

/// Every key the store knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    Token,
    Subdomain,
    AutoClockInTime,
    AutoClockOutTime,
    AutoClockInEnabled,
    AutoClockOutEnabled,
}

impl StoreKey {
    pub const ALL: [StoreKey; 6] = [
        StoreKey::Token,
        StoreKey::Subdomain,
        StoreKey::AutoClockInTime,
        StoreKey::AutoClockOutTime,
        StoreKey::AutoClockInEnabled,
        StoreKey::AutoClockOutEnabled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Token => "jwt",
            StoreKey::Subdomain => "subdomain",
            StoreKey::AutoClockInTime => "autoClockInTime",
            StoreKey::AutoClockOutTime => "autoClockOutTime",
            StoreKey::AutoClockInEnabled => "autoClockInEnabled",
            StoreKey::AutoClockOutEnabled => "autoClockOutEnabled",
        }
    }

    /// Value returned for the key when nothing has been stored yet.
    pub fn default_value(&self) -> Value {
        match self {
            StoreKey::Token | StoreKey::Subdomain | StoreKey::AutoClockInTime | StoreKey::AutoClockOutTime => Value::String(String::new()),
            StoreKey::AutoClockInEnabled | StoreKey::AutoClockOutEnabled => Value::Bool(false),
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, StoreKey::AutoClockInEnabled | StoreKey::AutoClockOutEnabled)
    }
}

impl FromStr for StoreKey {
    type Err = KekaError;

    fn from_str(key: &str) -> KekaResult<Self> {
        if key.is_empty() {
            return Err(KekaError::Storage("a non-empty key must be provided".to_string()));
        }
        StoreKey::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| KekaError::Storage(format!("unknown store key '{}'", key)))
    }
}

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Opens the store file in the application data directory.
    pub fn new() -> KekaResult<Self> {
        Ok(Self::at(DataStorage::new().get_path(STORE_FILE_NAME)?))
    }

    /// Opens a store backed by an explicit file path.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads a value by raw key, falling back to the key's default.
    pub fn get(&self, key: &str) -> KekaResult<Value> {
        let key: StoreKey = key.parse()?;
        let mut data = self.load()?;
        Ok(data.remove(key.as_str()).unwrap_or_else(|| key.default_value()))
    }

    /// Writes a value by raw key.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> KekaResult<()> {
        if key.is_empty() {
            return Err(KekaError::Storage("a non-empty key must be provided".to_string()));
        }
        let mut data = self.load()?;
        data.insert(key.to_string(), value.into());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&Value::Object(data))?)?;
        Ok(())
    }

    pub fn get_string(&self, key: StoreKey) -> KekaResult<String> {
        match self.get(key.as_str())? {
            Value::String(s) => Ok(s),
            Value::Null => Ok(String::new()),
            other => Err(KekaError::Storage(format!("'{}' holds {} instead of a string", key.as_str(), other))),
        }
    }

    pub fn get_bool(&self, key: StoreKey) -> KekaResult<bool> {
        match self.get(key.as_str())? {
            Value::Bool(b) => Ok(b),
            Value::Null => Ok(false),
            other => Err(KekaError::Storage(format!("'{}' holds {} instead of a boolean", key.as_str(), other))),
        }
    }

    pub fn set_string(&self, key: StoreKey, value: &str) -> KekaResult<()> {
        self.set(key.as_str(), value)
    }

    pub fn set_bool(&self, key: StoreKey, value: bool) -> KekaResult<()> {
        self.set(key.as_str(), value)
    }

    fn load(&self) -> KekaResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Err(KekaError::Storage(format!("{} does not contain a JSON object", self.path.display()))),
        }
    }
}
