//! File-backed cache store under the XDG cache directory.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::store::{CacheStore, CacheStoreError};

/// One JSON file per cache key.
///
/// Storage layout:
/// ```text
/// $XDG_CACHE_HOME/gitpulse/cache/
/// ├── {sha256(key)}.json   # {"key": "...", "value": {...}, "expiresAt": ms}
/// └── ...
/// ```
///
/// An expired file is deleted when its key is read, and every `put` sweeps
/// the directory for other expired files.
pub struct FileCacheStore {
    dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    key: String,
    value: Value,
    #[serde(default)]
    expires_at: i64,
}

impl StoredEntry {
    const fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }
}

impl FileCacheStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under `$XDG_CACHE_HOME/gitpulse/cache`.
    ///
    /// # Errors
    ///
    /// Returns an error if the XDG cache directory cannot be determined.
    pub fn in_user_cache_dir() -> Result<Self, CacheStoreError> {
        let cache_dir = dirs::cache_dir().ok_or(CacheStoreError::NoCacheDir)?;
        Ok(Self::new(cache_dir.join("gitpulse").join("cache")))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hash a key into a file-name-safe identifier.
    fn hash_key(key: &str) -> String {
        hex::encode(Sha256::digest(key.as_bytes()))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::hash_key(key)))
    }

    fn read_entry(path: &Path) -> Result<StoredEntry, CacheStoreError> {
        let file = File::open(path).map_err(CacheStoreError::Read)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(CacheStoreError::Parse)
    }

    fn write_entry(path: &Path, entry: &StoredEntry) -> Result<(), CacheStoreError> {
        let file = File::create(path).map_err(CacheStoreError::Write)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, entry).map_err(CacheStoreError::Serialize)?;
        writer.flush().map_err(CacheStoreError::Write)
    }

    /// Delete every entry file matching `remove`, returning how many went.
    ///
    /// Unreadable files are logged and left alone.
    fn remove_where(
        dir: &Path,
        remove: impl Fn(&StoredEntry) -> bool,
    ) -> Result<usize, CacheStoreError> {
        if !dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for dir_entry in fs::read_dir(dir).map_err(CacheStoreError::Read)? {
            let path = dir_entry.map_err(CacheStoreError::Read)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match Self::read_entry(&path) {
                Ok(entry) if remove(&entry) => {
                    fs::remove_file(&path).map_err(CacheStoreError::Write)?;
                    removed += 1;
                }
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable cache file {}: {e}", path.display()),
            }
        }

        Ok(removed)
    }

    fn get_blocking(path: &Path, key: &str) -> Result<Option<Value>, CacheStoreError> {
        if !path.exists() {
            return Ok(None);
        }

        let entry = Self::read_entry(path)?;

        // Guard against a hash collision handing back another key's value
        if entry.key != key {
            return Ok(None);
        }

        if entry.is_expired(Utc::now().timestamp_millis()) {
            fs::remove_file(path).map_err(CacheStoreError::Write)?;
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    fn put_blocking(dir: &Path, path: &Path, entry: &StoredEntry) -> Result<(), CacheStoreError> {
        fs::create_dir_all(dir).map_err(CacheStoreError::CreateDir)?;

        let now_ms = Utc::now().timestamp_millis();
        let swept = Self::remove_where(dir, |stored| stored.is_expired(now_ms))?;
        if swept > 0 {
            log::debug!("Swept {swept} expired cache file(s) from {}", dir.display());
        }

        Self::write_entry(path, entry)
    }
}

/// Run blocking file work off the async worker threads.
async fn blocking<T, F>(work: F) -> Result<T, CacheStoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CacheStoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CacheStoreError::Unavailable(e.to_string()))?
}

#[async_trait::async_trait]
impl CacheStore for FileCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheStoreError> {
        let path = self.entry_path(key);
        let key = key.to_string();

        blocking(move || Self::get_blocking(&path, &key)).await
    }

    async fn put(&self, key: &str, value: Value, ttl_secs: u64) -> Result<(), CacheStoreError> {
        let dir = self.dir.clone();
        let path = self.entry_path(key);
        let ttl_ms = i64::try_from(ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        let entry = StoredEntry {
            key: key.to_string(),
            value,
            expires_at: Utc::now().timestamp_millis().saturating_add(ttl_ms),
        };

        blocking(move || Self::put_blocking(&dir, &path, &entry)).await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheStoreError> {
        let dir = self.dir.clone();
        let prefix = prefix.to_string();

        blocking(move || Self::remove_where(&dir, |entry| entry.key.starts_with(&prefix))).await
    }
}
