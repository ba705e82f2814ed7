//! Application folder layout.
//!
//! Every persistent artifact lives under one application data folder:
//!
//! ```text
//! <app data>/
//!   cache/        time-expiring documents (update descriptor, ...)
//!   logs/         relative --log-file paths resolve here
//!   settings/     one YAML file per settings scope
//!   error.log.*   warnings and errors in interactive mode
//!   history.yaml  persisted rename history
//! ```
//!
//! Temporary files go to a separate folder that must exist before anything
//! else runs.

use crate::APP_NAME;
use crate::models::AppConfig;
use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};

/// Resolved application folder layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppFolders {
    app_data: Utf8PathBuf,
    cache: Utf8PathBuf,
    logs: Utf8PathBuf,
    settings: Utf8PathBuf,
    temp: Utf8PathBuf,
}

impl AppFolders {
    /// Resolve folders from configuration overrides or platform defaults
    pub fn resolve(config: &AppConfig) -> Result<Self> {
        let app_data = match &config.app_dir {
            Some(dir) => dir.clone(),
            None => {
                let base = dirs::data_local_dir()
                    .or_else(dirs::data_dir)
                    .ok_or_else(|| anyhow!("No application data directory available"))?;
                Utf8PathBuf::from_path_buf(base)
                    .map_err(|p| anyhow!("Application data directory is not UTF-8: {}", p.display()))?
                    .join(APP_NAME)
            }
        };

        let temp = match &config.temp_dir {
            Some(dir) => dir.clone(),
            None => Utf8PathBuf::from_path_buf(std::env::temp_dir())
                .map_err(|p| anyhow!("Temp directory is not UTF-8: {}", p.display()))
                .context("Failed to resolve temp directory")?
                .join(APP_NAME),
        };

        Ok(Self::with_root(app_data, temp))
    }

    /// Layout rooted at explicit application data and temp folders
    pub fn with_root(app_data: Utf8PathBuf, temp: Utf8PathBuf) -> Self {
        Self {
            cache: app_data.join("cache"),
            logs: app_data.join("logs"),
            settings: app_data.join("settings"),
            app_data,
            temp,
        }
    }

    /// The persisted rename history
    pub fn history_file(&self) -> Utf8PathBuf {
        self.app_data.join("history.yaml")
    }

    pub fn app_data(&self) -> &Utf8Path {
        &self.app_data
    }

    pub fn cache(&self) -> &Utf8Path {
        &self.cache
    }

    pub fn logs(&self) -> &Utf8Path {
        &self.logs
    }

    pub fn settings(&self) -> &Utf8Path {
        &self.settings
    }

    pub fn temp(&self) -> &Utf8Path {
        &self.temp
    }
}
