// reelname - media renamer launcher
//
// This is the library crate containing the startup sequence, the process-wide
// singletons and the interactive shell. The binary crate (main.rs) only hands
// the process arguments to the launcher.

pub mod about;
pub mod args;
pub mod cache;
pub mod cli;
pub mod config;
pub mod environment;
pub mod history;
pub mod launcher;
pub mod logging;
pub mod maintenance;
pub mod metrics;
pub mod mode;
pub mod models;
pub mod sandbox;
pub mod services;
pub mod settings;
pub mod ui;

// Re-export commonly used types for convenience
pub use args::{CliAction, LogLevel, StartupArguments};
pub use config::{AppFolders, ConfigManager};
pub use environment::{HostEnvironment, RuntimeProperties, SystemHost};
pub use mode::{ClearTargets, ExecutionDecision, ModeResolver};
pub use models::{AppConfig, BuildRevision, UpdateInfo, WindowGeometry};
pub use settings::Settings;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Settings scope holding application-wide preferences (first-run flag, history switch)
pub const APP_SETTINGS_SCOPE: &str = "reelname";

/// Settings scope holding main window state
pub const WINDOW_SETTINGS_SCOPE: &str = "reelname.ui";

/// Process exit status for success, help, version and maintenance actions
pub const EXIT_SUCCESS: i32 = 0;

/// Process exit status for illegal arguments and refused or failed startups
pub const EXIT_FAILURE: i32 = 1;
