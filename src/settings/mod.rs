// Persisted settings store
//
// Named scopes of string key/value pairs, each stored as one YAML map under
// the settings folder. The lock only guards in-memory access; flushes from the
// startup worker and the close handler may overlap, so each one stages into
// its own file before replacing the scope.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use tempfile::NamedTempFile;
use std::fs;
use std::io::Write;
use std::sync::{Arc, PoisonError, RwLock};

/// A named settings scope backed by `<root>/<scope>.yaml`
///
/// Cloning is cheap and clones share the same in-memory map.
///
/// # Usage
///
/// - [`get()`](Self::get) / [`put()`](Self::put) for single keys
/// - [`read()`](Self::read) / [`update()`](Self::update) for closures over the whole map
/// - [`flush()`](Self::flush) to write the map to disk
#[derive(Debug, Clone)]
pub struct Settings {
    scope: String,
    path: Utf8PathBuf,
    values: Arc<RwLock<IndexMap<String, String>>>,
}

impl Settings {
    /// Open a scope, loading previously flushed values.
    ///
    /// A corrupt scope file is logged and treated as empty.
    pub fn open(root: &Utf8Path, scope: &str) -> Result<Self> {
        if !root.exists() {
            fs::create_dir_all(root)
                .with_context(|| format!("Failed to create settings directory: {}", root))?;
        }

        let path = root.join(format!("{}.yaml", scope));
        let values = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings: {}", path))?;

            match serde_yaml_ng::from_str::<Option<IndexMap<String, String>>>(&contents) {
                Ok(values) => values.unwrap_or_default(),
                Err(e) => {
                    tracing::warn!("Ignoring corrupt settings file {}: {}", path, e);
                    IndexMap::new()
                }
            }
        } else {
            IndexMap::new()
        };

        tracing::debug!("Opened settings scope {} ({} keys)", scope, values.len());

        Ok(Self {
            scope: scope.to_string(),
            path,
            values: Arc::new(RwLock::new(values)),
        })
    }

    /// Remove every scope stored under `root`.
    ///
    /// Returns the number of scopes removed.
    pub fn clear_all(root: &Utf8Path) -> Result<usize> {
        if !root.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(root).with_context(|| format!("Failed to list {}", root))? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Execute a function with read access to the values
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&IndexMap<String, String>) -> R,
    {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        f(&values)
    }

    /// Mutate the in-memory values; call [`flush()`](Self::flush) to persist
    pub fn update<F>(&self, update_fn: F)
    where
        F: FnOnce(&mut IndexMap<String, String>),
    {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        update_fn(&mut values);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.read(|values| values.get(key).cloned())
    }

    pub fn put(&self, key: &str, value: impl Into<String>) {
        let value = value.into();
        self.update(|values| {
            values.insert(key.to_string(), value);
        });
    }

    /// Typed view of a single key with a default value
    pub fn entry<'a>(&'a self, key: &'a str) -> SettingsEntry<'a> {
        SettingsEntry {
            settings: self,
            key,
            default: String::new(),
        }
    }

    /// Write the current values to disk
    pub fn flush(&self) -> Result<()> {
        let yaml = self.read(|values| serde_yaml_ng::to_string(values)).with_context(|| {
            format!("Failed to serialize settings scope {}", self.scope)
        })?;

        let root = self.path.parent().unwrap_or(Utf8Path::new("."));
        let mut staging = NamedTempFile::new_in(root)
            .with_context(|| format!("Failed to stage settings in {}", root))?;
        staging
            .write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write settings: {}", self.path))?;
        staging
            .persist(&self.path)
            .with_context(|| format!("Failed to replace settings: {}", self.path))?;

        tracing::trace!("Flushed settings scope {}", self.scope);
        Ok(())
    }

    /// Remove every key from memory and disk
    pub fn clear(&self) -> Result<()> {
        self.update(|values| values.clear());

        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove settings: {}", self.path))?;
        }

        tracing::info!("Cleared settings scope {}", self.scope);
        Ok(())
    }
}

/// One key of a [`Settings`] scope with a default value
pub struct SettingsEntry<'a> {
    settings: &'a Settings,
    key: &'a str,
    default: String,
}

impl SettingsEntry<'_> {
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    pub fn value(&self) -> String {
        self.settings
            .get(self.key)
            .unwrap_or_else(|| self.default.clone())
    }

    pub fn set_value(&self, value: impl Into<String>) {
        self.settings.put(self.key, value);
    }

    /// Persist the owning scope
    pub fn flush(&self) -> Result<()> {
        self.settings.flush()
    }

    /// Interpret the value as a boolean flag
    pub fn as_bool(&self) -> bool {
        matches!(
            self.value().trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        )
    }
}
