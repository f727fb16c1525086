//! Persistent memoization of resolved versions and changelogs
//!
//! Resolving a version can mean downloading a multi-megabyte archive and
//! resolving a changelog can mean a network round trip, so both results
//! are memoized per file across runs. The cache holds two independent
//! `FileKey -> String` namespaces, is loaded once at process start, and
//! persisted once at process end; a failure sentinel stored as a version
//! keeps permanently broken artifacts from retriggering downloads.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::platform::FileKey;

/// On-disk cache format version; any other value invalidates the file
pub const CACHE_FORMAT_VERSION: u32 = 5;

#[derive(Debug, Error)]
enum CacheIoError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    project: String,
    file: String,
    value: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFileFormat {
    version: u32,
    changelogs: Vec<CacheRecord>,
    versions: Vec<CacheRecord>,
}

/// Compute-once cache for per-file version strings and changelog text
#[derive(Debug, Default)]
pub struct FileCache {
    changelogs: HashMap<FileKey, String>,
    versions: HashMap<FileKey, String>,
}

impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached changelog for `key`, computing and storing it on
    /// the first call
    ///
    /// The compute closure runs at most once per key per process; a stored
    /// empty string counts as a hit.
    pub async fn changelog<F, Fut>(&mut self, key: &FileKey, compute: F) -> String
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = String>,
    {
        if let Some(value) = self.changelogs.get(key) {
            return value.clone();
        }
        let value = compute().await;
        self.changelogs.insert(key.clone(), value.clone());
        value
    }

    /// Returns the cached version for `key`, computing and storing it on
    /// the first call; separate namespace from [`FileCache::changelog`]
    pub async fn version<F, Fut>(&mut self, key: &FileKey, compute: F) -> String
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = String>,
    {
        if let Some(value) = self.versions.get(key) {
            return value.clone();
        }
        let value = compute().await;
        self.versions.insert(key.clone(), value.clone());
        value
    }

    /// Loads the cache from `path`, replacing the in-memory state
    ///
    /// A missing file leaves the cache empty. An unreadable file or a
    /// format version mismatch discards the whole file with a diagnostic;
    /// the cache is never partially loaded.
    pub fn load(&mut self, path: &Path) {
        self.changelogs.clear();
        self.versions.clear();
        if !path.exists() {
            return;
        }
        match Self::read_file(path) {
            Ok(Some((changelogs, versions))) => {
                debug!(
                    "Loaded cache from {} ({} versions, {} changelogs)",
                    path.display(),
                    versions.len(),
                    changelogs.len()
                );
                self.changelogs = changelogs;
                self.versions = versions;
            }
            Ok(None) => {
                warn!(
                    "Cache {} has a different format version, starting cold",
                    path.display()
                );
            }
            Err(e) => {
                warn!("Failed to read cache {}: {}", path.display(), e);
            }
        }
    }

    /// Persists both namespaces to `path`, creating parent directories and
    /// replacing any previous file atomically
    ///
    /// A write failure is logged and the run continues without a cache.
    pub fn persist(&self, path: &Path) {
        if let Err(e) = self.write_file(path) {
            warn!("Failed to write cache {}: {}", path.display(), e);
        }
    }

    fn read_file(
        path: &Path,
    ) -> Result<Option<(HashMap<FileKey, String>, HashMap<FileKey, String>)>, CacheIoError> {
        let content = std::fs::read_to_string(path)?;
        let file: CacheFileFormat = serde_json::from_str(&content)?;
        if file.version != CACHE_FORMAT_VERSION {
            return Ok(None);
        }
        Ok(Some((
            Self::into_map(file.changelogs),
            Self::into_map(file.versions),
        )))
    }

    fn write_file(&self, path: &Path) -> Result<(), CacheIoError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent)?;
                parent
            }
            _ => Path::new("."),
        };

        let file = CacheFileFormat {
            version: CACHE_FORMAT_VERSION,
            changelogs: Self::into_records(&self.changelogs),
            versions: Self::into_records(&self.versions),
        };
        let json = serde_json::to_string(&file)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(json.as_bytes())?;
        temp.write_all(b"\n")?;
        temp.persist(path).map_err(|e| CacheIoError::Io(e.error))?;
        Ok(())
    }

    fn into_map(records: Vec<CacheRecord>) -> HashMap<FileKey, String> {
        records
            .into_iter()
            .map(|record| (FileKey::new(record.project, record.file), record.value))
            .collect()
    }

    fn into_records(map: &HashMap<FileKey, String>) -> Vec<CacheRecord> {
        map.iter()
            .map(|(key, value)| CacheRecord {
                project: key.project.clone(),
                file: key.file.clone(),
                value: value.clone(),
            })
            .collect()
    }
}
