//! Durable user-preference storage.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::i18n::errors::LocalizeError;
use crate::util::lock;

/// Key holding the last confirmed-good locale code.
pub const PREFERRED_LANGUAGE_KEY: &str = "preferred-language";

/// Key/value storage for user preferences.
pub trait PreferenceStore: Send + Sync {
    /// What: Read a stored value.
    ///
    /// # Errors
    /// - Returns `LocalizeError::Storage` when the backing store cannot be read
    fn get(&self, key: &str) -> Result<Option<String>, LocalizeError>;

    /// What: Store a value, replacing any previous one.
    ///
    /// # Errors
    /// - Returns `LocalizeError::Storage` when the backing store cannot be written
    fn set(&self, key: &str, value: &str) -> Result<(), LocalizeError>;
}

/// Preferences kept in memory for the lifetime of the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `locale` under [`PREFERRED_LANGUAGE_KEY`].
    #[must_use]
    pub fn with_preferred(locale: &str) -> Self {
        let store = Self::new();
        lock(&store.values).insert(PREFERRED_LANGUAGE_KEY.to_string(), locale.to_string());
        store
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalizeError> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalizeError> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences persisted as a flat JSON object on disk.
///
/// A missing file reads as an empty store. Writes rewrite the whole file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // serializes read-modify-write cycles within the process
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole preference map.
    fn read_all(&self) -> Result<BTreeMap<String, String>, LocalizeError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(LocalizeError::Storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            LocalizeError::Storage(format!("failed to parse {}: {e}", self.path.display()))
        })
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalizeError> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalizeError> {
        let _guard = lock(&self.write_lock);
        // a corrupt file is replaced rather than blocking every future write
        let mut values = self.read_all().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "[Persist] Discarding unreadable preferences");
            BTreeMap::new()
        });
        values.insert(key.to_string(), value.to_string());
        let serialized = serde_json::to_string_pretty(&values)
            .map_err(|e| LocalizeError::Storage(e.to_string()))?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                LocalizeError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        fs::write(&self.path, serialized).map_err(|e| {
            LocalizeError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })?;
        tracing::debug!(
            path = %self.path.display(),
            key,
            "[Persist] Preference written"
        );
        Ok(())
    }
}
