//! Time-expiring payload cache
//!
//! Raw catalog responses are stored per section cache key as
//! `{capturedAt, payload}`. The store is an optimization only: every
//! storage or serialization failure is logged and reported as a miss, and
//! no error ever leaves [`CacheStore`].

use liri_common::config::{CacheBackendKind, CacheConfig};
use liri_common::time;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix shared by every key this crate writes
pub const KEY_PREFIX: &str = "liri-menu";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache storage error: {0}")]
    Storage(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<io::Error> for CacheError {
    fn from(err: io::Error) -> Self {
        CacheError::Storage(err.to_string())
    }
}

/// String-keyed persistence behind the cache
pub trait CacheStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn write(&self, key: &str, value: &str) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

impl<S: CacheStorage + ?Sized> CacheStorage for Arc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CacheError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        (**self).keys()
    }
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Storage("memory cache lock poisoned".to_string()))
    }
}

impl CacheStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

/// One JSON file per key in a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", file_stem(key)))
    }
}

/// File-name-safe form of a key
fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl CacheStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a temp file, then rename over the target
    fn write(&self, key: &str, value: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.directory)?;
        let target = self.path_for(key);
        let temp = target.with_extension("json.tmp");
        fs::write(&temp, value)?;
        if let Err(e) = fs::rename(&temp, &target) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        Ok(keys)
    }
}

/// Stored form of a cached payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Unix milliseconds
    pub captured_at: i64,
    pub payload: Value,
}

/// Versioned, TTL-bounded view over a [`CacheStorage`]
pub struct CacheStore {
    storage: Option<Box<dyn CacheStorage>>,
    version: String,
    ttl_millis: u64,
}

impl CacheStore {
    pub fn new(storage: Box<dyn CacheStorage>, version: &str, ttl: std::time::Duration) -> Self {
        Self {
            storage: Some(storage),
            version: version.to_string(),
            ttl_millis: ttl.as_millis() as u64,
        }
    }

    /// A store that never reads or writes
    pub fn disabled() -> Self {
        Self {
            storage: None,
            version: String::new(),
            ttl_millis: 0,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        if !config.enabled {
            debug!("Payload cache disabled");
            return Self::disabled();
        }
        let storage: Box<dyn CacheStorage> = match config.backend {
            CacheBackendKind::Memory => Box::new(MemoryStorage::new()),
            CacheBackendKind::File => Box::new(FileStorage::new(config.resolved_directory())),
        };
        Self::new(
            storage,
            &config.version,
            std::time::Duration::from_secs(config.ttl_secs),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.storage.is_some()
    }

    /// Full storage key for a section cache key
    pub fn key(&self, cache_key: &str) -> String {
        format!("{}-{}-{}", KEY_PREFIX, self.version, cache_key)
    }

    pub fn get(&self, cache_key: &str) -> Option<Value> {
        self.get_at(cache_key, time::now_millis())
    }

    /// Lookup as of `now` (unix millis); expired or unreadable entries are evicted
    pub fn get_at(&self, cache_key: &str, now: i64) -> Option<Value> {
        let storage = self.storage.as_ref()?;
        let key = self.key(cache_key);

        let raw = match storage.read(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt cache entry, evicting");
                self.evict(storage.as_ref(), &key);
                return None;
            }
        };

        if time::age_millis(entry.captured_at, now) >= self.ttl_millis {
            debug!(key = %key, "Cache entry expired, evicting");
            self.evict(storage.as_ref(), &key);
            return None;
        }

        debug!(key = %key, "Cache hit");
        Some(entry.payload)
    }

    pub fn put(&self, cache_key: &str, payload: &Value) {
        self.put_at(cache_key, payload, time::now_millis())
    }

    /// Store `payload` captured at `now` (unix millis); failures are logged only
    pub fn put_at(&self, cache_key: &str, payload: &Value, now: i64) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };
        let key = self.key(cache_key);
        let entry = CacheEntry {
            captured_at: now,
            payload: payload.clone(),
        };
        let result = serde_json::to_string(&entry)
            .map_err(CacheError::from)
            .and_then(|raw| storage.write(&key, &raw));
        match result {
            Ok(()) => debug!(key = %key, "Cached payload"),
            Err(e) => warn!(key = %key, error = %e, "Cache write failed"),
        }
    }

    /// Remove every entry written by this crate; returns how many were removed
    pub fn clear(&self) -> usize {
        let Some(storage) = self.storage.as_ref() else {
            return 0;
        };
        let keys = match storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Could not list cache entries");
                return 0;
            }
        };

        let prefix = format!("{}-", KEY_PREFIX);
        keys.iter()
            .filter(|k| k.starts_with(&prefix))
            .filter(|k| match storage.remove(k) {
                Ok(()) => true,
                Err(e) => {
                    warn!(key = %k, error = %e, "Could not remove cache entry");
                    false
                }
            })
            .count()
    }

    fn evict(&self, storage: &dyn CacheStorage, key: &str) {
        if let Err(e) = storage.remove(key) {
            warn!(key = %key, error = %e, "Could not evict cache entry");
        }
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("enabled", &self.is_enabled())
            .field("version", &self.version)
            .field("ttl_millis", &self.ttl_millis)
            .finish()
    }
}
