//! Session Storage
//!
//! Process-wide key-value storage for the session credentials. The access
//! token lives under [`ACCESS_TOKEN_KEY`]; its absence means the user is
//! unauthenticated.
//!
//! Two implementations are provided:
//! - `MemorySessionStore` - volatile, for tests and short-lived tools
//! - `FileSessionStore` - JSON map persisted to disk on every write

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{CoreError, CoreResult};

/// Storage key for the bearer access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Key-value storage for session credentials.
///
/// Implementations must be safe to share between tasks; all methods take
/// `&self`.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> CoreResult<()>;

    fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Remove every key in `keys`. All removals are attempted; the first
    /// failure is returned afterwards.
    fn remove_all(&self, keys: &[&str]) -> CoreResult<()> {
        let mut first_err = None;
        for key in keys {
            if let Err(e) = self.remove(key) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Remove both the access and refresh tokens.
    fn clear_tokens(&self) -> CoreResult<()> {
        self.remove_all(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY])
    }
}

/// Volatile in-memory session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds an access token.
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.write() {
            entries.insert(ACCESS_TOKEN_KEY.to_string(), token.to_string());
        }
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.entries
            .write()
            .map_err(|_| CoreError::internal("session lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.entries
            .write()
            .map_err(|_| CoreError::internal("session lock poisoned"))?
            .remove(key);
        Ok(())
    }
}

/// Session store backed by a JSON file.
///
/// The file is read once at open; every write rewrites it in full.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// Open the store at `path`. A missing file yields an empty store and is
    /// only created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        tracing::debug!(
            path = %self.path.display(),
            keys = entries.len(),
            "Persisted session store"
        );
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CoreError::internal("session lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CoreError::internal("session lock poisoned"))?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    /// Drops every key from memory first, then rewrites the file once. A
    /// failed write still leaves the keys gone for this process.
    fn remove_all(&self, keys: &[&str]) -> CoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CoreError::internal("session lock poisoned"))?;
        let mut removed = false;
        for key in keys {
            removed |= entries.remove(*key).is_some();
        }
        if removed {
            self.persist(&entries)?;
        }
        Ok(())
    }
}
