// Environment initializer
//
// Establishes process-wide preconditions before any feature code runs:
// the temp folder, the runtime properties used by network and filesystem
// code, and the default expression sandbox policy.

use crate::args::StartupArguments;
use crate::config::AppFolders;
use crate::models::AppConfig;
use crate::sandbox::{self, SandboxPolicy};
use crate::{APP_NAME, VERSION};
use anyhow::{Context, Result};
use std::fs;
use std::io::IsTerminal;
use std::sync::OnceLock;
use std::time::Duration;

/// Process-wide settings derived from configuration and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeProperties {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Strict unix file name semantics
    pub unix_fs: bool,
    /// Read and write extended file attributes
    pub extended_attributes: bool,
    /// Store creation dates in extended attributes
    pub creation_date: bool,
}

impl RuntimeProperties {
    pub fn new(args: &StartupArguments, config: &AppConfig) -> Self {
        Self {
            user_agent: format!("{} {}", APP_NAME, VERSION),
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            read_timeout: Duration::from_millis(config.read_timeout_ms),
            unix_fs: args.unixfs,
            extended_attributes: !args.disable_xattr,
            creation_date: !args.disable_xattr,
        }
    }

    /// The installed properties, if the environment has been initialized
    pub fn get() -> Option<&'static RuntimeProperties> {
        PROPERTIES.get()
    }

    /// The installed properties, or defaults when running outside the launcher
    pub fn current() -> RuntimeProperties {
        match Self::get() {
            Some(properties) => properties.clone(),
            None => Self::new(&StartupArguments::default(), &AppConfig::default()),
        }
    }
}

static PROPERTIES: OnceLock<RuntimeProperties> = OnceLock::new();

/// Prepare the process environment.
///
/// Creating the temp folder is the only fatal step. Properties are installed
/// once; later calls return the first value.
pub fn initialize(
    args: &StartupArguments,
    config: &AppConfig,
    folders: &AppFolders,
) -> Result<&'static RuntimeProperties> {
    let temp = folders.temp();
    if !temp.exists() {
        fs::create_dir_all(temp)
            .with_context(|| format!("Failed to create temp directory: {}", temp))?;
    }

    let requested = RuntimeProperties::new(args, config);
    let installed = PROPERTIES.get_or_init(|| requested.clone());
    if *installed != requested {
        tracing::debug!("Runtime properties already initialized, keeping first value");
    }

    Ok(installed)
}

/// Install the permissive default sandbox policy.
///
/// An already installed policy is kept and the failure only logged.
pub fn install_sandbox() {
    match sandbox::install_default(SandboxPolicy::permissive()) {
        Ok(()) => tracing::debug!("Installed permissive sandbox policy"),
        Err(e) => tracing::warn!("Failed to install sandbox policy: {}", e),
    }
}

/// Facts about the host the process runs in
#[cfg_attr(test, mockall::automock)]
pub trait HostEnvironment {
    /// Whether an interactive console is attached to the process
    fn console_attached(&self) -> bool;

    /// Whether no display is available for windows
    fn headless(&self) -> bool;

    /// Read an environment variable
    fn var(&self, key: &str) -> Option<String>;
}

/// The real host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostEnvironment for SystemHost {
    fn console_attached(&self) -> bool {
        std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
    }

    fn headless(&self) -> bool {
        if cfg!(any(target_os = "windows", target_os = "macos")) {
            return false;
        }
        self.var("DISPLAY").is_none() && self.var("WAYLAND_DISPLAY").is_none()
    }

    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|value| !value.is_empty())
    }
}
