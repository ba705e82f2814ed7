use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use super::update::BuildRevision;

/// Default location of the update descriptor document
pub const DEFAULT_UPDATE_URL: &str = "https://www.reelname.net/update.xml";

/// Application configuration loaded by [`ConfigManager`](crate::config::ConfigManager).
///
/// Values come from built-in defaults, an optional `reelname.yaml` file and
/// `REELNAME_*` environment variables, in increasing precedence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Override for the application data folder
    pub app_dir: Option<Utf8PathBuf>,

    /// Override for the temporary file folder
    pub temp_dir: Option<Utf8PathBuf>,

    /// Running from a portable package (forces the bundled theme)
    pub portable: bool,

    /// Never show the getting started guide
    pub skip_getting_started: bool,

    /// Never check for updates
    pub skip_update_check: bool,

    /// Location of the update descriptor
    pub update_url: String,

    /// Revision number of the running build
    pub revision: u32,

    /// Revision number marking development builds
    pub dev_revision: u32,

    /// Network connect timeout in milliseconds
    pub connect_timeout_ms: u64,

    /// Network read timeout in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_dir: None,
            temp_dir: None,
            portable: false,
            skip_getting_started: false,
            skip_update_check: false,
            update_url: DEFAULT_UPDATE_URL.to_string(),
            revision: default_revision(),
            dev_revision: 0,
            connect_timeout_ms: 10_000,
            read_timeout_ms: 60_000,
        }
    }
}

impl AppConfig {
    /// Revision of the running build together with the development sentinel
    pub fn build_revision(&self) -> BuildRevision {
        BuildRevision::new(self.revision, self.dev_revision)
    }
}

fn default_revision() -> u32 {
    option_env!("REELNAME_REVISION")
        .and_then(|revision| revision.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.update_url, DEFAULT_UPDATE_URL);
        assert_eq!(config.connect_timeout_ms, 10_000);
        assert_eq!(config.read_timeout_ms, 60_000);
        assert_eq!(config.dev_revision, 0);
        assert!(!config.portable);
        assert!(!config.skip_update_check);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: AppConfig = serde_yaml_ng::from_str("portable: true\nrevision: 40\n").unwrap();
        assert!(config.portable);
        assert_eq!(config.revision, 40);
        assert_eq!(config.read_timeout_ms, 60_000);
        assert!(config.app_dir.is_none());
    }
}
