//! Credential storage backends.
//!
//! A `SessionStore` holds exactly two values, the access and refresh
//! credentials. Everything that reads or writes them goes through this
//! trait so tests can swap in a `MemoryStore`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKey {
    Access,
    Refresh,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 2] = [CredentialKey::Access, CredentialKey::Refresh];

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::Access => "access",
            CredentialKey::Refresh => "refresh",
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait SessionStore: Send + Sync {
    fn get(&self, key: CredentialKey) -> Result<Option<String>>;

    fn set(&self, key: CredentialKey, value: &str) -> Result<()>;

    /// Remove a value. Removing an absent value is not an error.
    fn remove(&self, key: CredentialKey) -> Result<()>;
}

/// In-process store, used by tests and as a throwaway backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<CredentialKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with both credentials.
    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.insert(CredentialKey::Access, access.to_string());
            values.insert(CredentialKey::Refresh, refresh.to_string());
        }
        store
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(values.get(&key).cloned())
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow!("memory store lock poisoned"))?;
        values.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: CredentialKey) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow!("memory store lock poisoned"))?;
        values.remove(&key);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl StoredCredentials {
    fn slot(&mut self, key: CredentialKey) -> &mut Option<String> {
        match key {
            CredentialKey::Access => &mut self.access,
            CredentialKey::Refresh => &mut self.refresh,
        }
    }

    fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// JSON file in the cache directory. The file is deleted once both
/// credentials are gone.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(SESSION_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoredCredentials> {
        if !self.path.exists() {
            return Ok(StoredCredentials::default());
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read session file")?;
        serde_json::from_str(&contents).context("Failed to parse session file")
    }

    fn save(&self, creds: &StoredCredentials) -> Result<()> {
        if creds.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove session file")?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(creds)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn modify(&self, key: CredentialKey, value: Option<&str>) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("session file lock poisoned"))?;
        let mut creds = self.load()?;
        *creds.slot(key) = value.map(str::to_string);
        creds.updated_at = Some(Utc::now());
        self.save(&creds)
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("session file lock poisoned"))?;
        let mut creds = self.load()?;
        Ok(creds.slot(key).take())
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<()> {
        self.modify(key, Some(value))
    }

    fn remove(&self, key: CredentialKey) -> Result<()> {
        self.modify(key, None)
    }
}
