use crate::APP_NAME;
use crate::models::AppConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

pub mod folders;

pub use folders::AppFolders;

/// Prefix of environment variables overriding configuration keys
pub const ENV_PREFIX: &str = "REELNAME";

/// Configuration manager for loading and saving the application configuration.
///
/// Layers, in increasing precedence:
/// - Built-in defaults ([`AppConfig::default`])
/// - Optional YAML file (`<config dir>/reelname/reelname.yaml`)
/// - `REELNAME_*` environment variables (e.g. `REELNAME_SKIP_UPDATE_CHECK=true`)
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Option<Utf8PathBuf>,
    env_prefix: String,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a ConfigManager reading the platform default configuration file
    pub fn new() -> Self {
        let config_path = dirs::config_dir()
            .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
            .map(|dir| dir.join(APP_NAME).join(format!("{}.yaml", APP_NAME)));

        Self {
            config_path,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Create a ConfigManager reading the given configuration file
    pub fn with_file<P: AsRef<Utf8Path>>(config_path: P) -> Self {
        Self {
            config_path: Some(config_path.as_ref().to_path_buf()),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment variable prefix
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Load the layered application configuration.
    ///
    /// A missing configuration file is not an error.
    pub fn load(&self) -> Result<AppConfig> {
        let mut builder = config::Config::builder();

        if let Some(path) = &self.config_path {
            builder = builder.add_source(
                config::File::new(path.as_str(), config::FileFormat::Yaml).required(false),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .try_parsing(true),
        );

        let layered = builder
            .build()
            .context("Failed to build application configuration")?;

        let config: AppConfig = layered
            .try_deserialize()
            .context("Failed to parse application configuration")?;

        match &self.config_path {
            Some(path) if path.exists() => tracing::debug!("Loaded configuration from {}", path),
            _ => tracing::debug!("No configuration file, using defaults"),
        }

        Ok(config)
    }

    /// Save the configuration file.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let path = self
            .config_path
            .as_ref()
            .context("No configuration file location available")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent))?;
        }

        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize configuration to YAML")?;

        fs::write(path, yaml_string)
            .with_context(|| format!("Failed to write configuration: {}", path))?;

        tracing::info!("Saved configuration to {}", path);
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> Option<&Utf8Path> {
        self.config_path.as_deref()
    }
}
