// Time-expiring document cache
//
// Documents are grouped in named caches, one folder each under the cache
// root. Every entry is a small YAML file holding the fetch time and body.

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::sync::OnceLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);
pub const ONE_WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Errors raised by the cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache manager is not initialized")]
    NotInitialized,

    #[error("Cache I/O failed on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Fetching {key} failed after {attempts} attempt(s): {message}")]
    Fetch {
        key: String,
        attempts: u32,
        message: String,
    },
}

impl CacheError {
    fn io(path: &Utf8Path, source: io::Error) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

static CACHE_MANAGER: OnceLock<CacheManager> = OnceLock::new();

/// Owner of the cache root folder
#[derive(Debug, Clone)]
pub struct CacheManager {
    root: Utf8PathBuf,
}

impl CacheManager {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Install the process-wide manager; later calls return the first one
    pub fn initialize(root: &Utf8Path) -> &'static CacheManager {
        let manager = CACHE_MANAGER.get_or_init(|| CacheManager::new(root));
        tracing::debug!("Cache manager rooted at {}", manager.root);
        manager
    }

    pub fn get() -> Result<&'static CacheManager, CacheError> {
        CACHE_MANAGER.get().ok_or(CacheError::NotInitialized)
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn cache(&self, name: &str) -> Cache {
        Cache {
            folder: self.root.join(sanitize(name)),
        }
    }

    /// Delete every top-level folder under the cache root.
    ///
    /// Returns the number of folders removed. Plain files are left alone.
    pub fn clear(&self) -> Result<usize, CacheError> {
        if !self.root.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&self.root).map_err(|e| CacheError::io(&self.root, e))?;
        let mut removed = 0;
        for entry in entries {
            let path = entry.map_err(|e| CacheError::io(&self.root, e))?.path();
            if path.is_dir() {
                tracing::debug!("Delete {}", path.display());
                fs::remove_dir_all(&path).map_err(|e| CacheError::Io {
                    path: Utf8PathBuf::from(path.to_string_lossy().into_owned()),
                    source: e,
                })?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    fetched_at: u64,
    body: String,
}

/// A named cache folder
#[derive(Debug, Clone)]
pub struct Cache {
    folder: Utf8PathBuf,
}

impl Cache {
    pub fn folder(&self) -> &Utf8Path {
        &self.folder
    }

    fn entry_path(&self, key: &str) -> Utf8PathBuf {
        self.folder.join(format!("{}.yaml", sanitize(key)))
    }

    /// Cached body of `key` if it was fetched less than `expire` ago
    pub fn get(&self, key: &str, expire: Duration) -> Option<String> {
        let path = self.entry_path(key);
        let contents = fs::read_to_string(&path).ok()?;

        let entry: CacheEntry = match serde_yaml_ng::from_str(&contents) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Ignoring corrupt cache entry {}: {}", path, e);
                return None;
            }
        };

        let fetched_at = UNIX_EPOCH + Duration::from_secs(entry.fetched_at);
        let age = SystemTime::now().duration_since(fetched_at).ok()?;
        (age < expire).then_some(entry.body)
    }

    pub fn put(&self, key: &str, body: &str) -> Result<(), CacheError> {
        self.put_at(key, body, SystemTime::now())
    }

    /// Store a body as if it had been fetched at `fetched_at`
    pub fn put_at(&self, key: &str, body: &str, fetched_at: SystemTime) -> Result<(), CacheError> {
        fs::create_dir_all(&self.folder).map_err(|e| CacheError::io(&self.folder, e))?;

        let entry = CacheEntry {
            fetched_at: fetched_at
                .duration_since(UNIX_EPOCH)
                .map(|age| age.as_secs())
                .unwrap_or_default(),
            body: body.to_string(),
        };
        let yaml = serde_yaml_ng::to_string(&entry)
            .map_err(|e| CacheError::io(&self.folder, io::Error::other(e.to_string())))?;

        let path = self.entry_path(key);
        fs::write(&path, yaml).map_err(|e| CacheError::io(&path, e))
    }

    /// Fresh cached text of `key`, or the result of `fetch`.
    ///
    /// `fetch` runs at most `retries + 1` times. A successful fetch is stored;
    /// a failed one returns the last error and leaves the cache untouched.
    pub fn text<F>(
        &self,
        key: &str,
        expire: Duration,
        retries: u32,
        mut fetch: F,
    ) -> Result<String, CacheError>
    where
        F: FnMut() -> Result<String>,
    {
        if let Some(body) = self.get(key, expire) {
            tracing::trace!("Cache hit {}", key);
            return Ok(body);
        }

        let attempts = retries + 1;
        let mut last_error = None;
        for attempt in 1..=attempts {
            match fetch() {
                Ok(body) => {
                    if let Err(e) = self.put(key, &body) {
                        tracing::warn!("Failed to cache {}: {}", key, e);
                    }
                    return Ok(body);
                }
                Err(e) => {
                    tracing::debug!("Fetch {} attempt {}/{} failed: {:#}", key, attempt, attempts, e);
                    last_error = Some(e);
                }
            }
        }

        Err(CacheError::Fetch {
            key: key.to_string(),
            attempts,
            message: last_error
                .map(|e| format!("{:#}", e))
                .unwrap_or_default(),
        })
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
