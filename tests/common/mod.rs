//! Shared fixtures for integration tests

#![allow(dead_code)]

use camino::Utf8PathBuf;
use reelname::{AppConfig, AppFolders, ConfigManager, HostEnvironment};
use std::collections::HashMap;
use tempfile::TempDir;

/// Host with fixed answers
#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    pub console: bool,
    pub headless: bool,
    pub vars: HashMap<String, String>,
}

impl FakeHost {
    pub fn desktop() -> Self {
        Self {
            console: true,
            headless: false,
            vars: HashMap::new(),
        }
    }

    pub fn unattended() -> Self {
        Self {
            console: false,
            ..Self::desktop()
        }
    }

    pub fn headless() -> Self {
        Self {
            headless: true,
            ..Self::desktop()
        }
    }
}

impl HostEnvironment for FakeHost {
    fn console_attached(&self) -> bool {
        self.console
    }

    fn headless(&self) -> bool {
        self.headless
    }

    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Temporary directory as a UTF-8 path
pub fn temp_root() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, root)
}

/// Folder layout inside `root`
pub fn folders(root: &Utf8PathBuf) -> AppFolders {
    AppFolders::with_root(root.join("data"), root.join("tmp"))
}

/// Configuration manager whose file points every folder into `root`
pub fn config_manager(root: &Utf8PathBuf) -> ConfigManager {
    let manager = ConfigManager::with_file(root.join("reelname.yaml"))
        .env_prefix("REELNAME_INTEGRATION_TEST");

    let config = AppConfig {
        app_dir: Some(root.join("data")),
        temp_dir: Some(root.join("tmp")),
        skip_update_check: true,
        ..AppConfig::default()
    };
    manager.save(&config).unwrap();

    manager
}
