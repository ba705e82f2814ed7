//! Process entry sequence.
//!
//! Turns raw process arguments into exactly one action and runs it:
//!
//! 1. parse arguments and resolve the [`ExecutionDecision`]
//! 2. short-circuit help, version and maintenance actions
//! 3. initialize environment, logging, cache manager, sandbox and history
//!    spooler, in that order and once per process
//! 4. run the command-line action, refuse a headless GUI, or hand over to
//!    the [`GuiBootstrap`]
//!
//! Every failure ends in exit status 1, panics included. Argument and panel
//! filter errors are reported as one line; anything else is logged with its
//! full cause chain.

use crate::about;
use crate::args::{ArgumentError, StartupArguments};
use crate::cache::CacheManager;
use crate::cli::ArgumentProcessor;
use crate::config::{AppFolders, ConfigManager};
use crate::environment::{self, HostEnvironment};
use crate::history::{HISTORY_PERSISTENT_KEY, HistorySpooler};
use crate::logging::{self, LoggingError, LoggingGuard};
use crate::maintenance;
use crate::metrics::StartupMetrics;
use crate::mode::{ExecutionDecision, ModeResolver};
use crate::models::AppConfig;
use crate::settings::Settings;
use crate::ui::{ConfigurationError, GuiBootstrap};
use crate::{APP_SETTINGS_SCOPE, EXIT_FAILURE, EXIT_SUCCESS};
use anyhow::Context;
use std::any::Any;
use std::ffi::OsString;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

/// Failure of the entry sequence
#[derive(Error, Debug)]
pub enum LaunchError {
    /// Reported as a single line without diagnostic detail
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

impl From<ArgumentError> for LaunchError {
    fn from(e: ArgumentError) -> Self {
        LaunchError::Usage(e.to_string())
    }
}

/// Run the application with the default configuration sources
pub fn launch<I, T>(argv: I, host: &dyn HostEnvironment) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    launch_with(argv, host, &ConfigManager::new())
}

/// Run the application and return the process exit status
pub fn launch_with<I, T>(argv: I, host: &dyn HostEnvironment, config_manager: &ConfigManager) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run(argv, host, config_manager)));
    let result = match outcome {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            if logging::is_initialized() {
                tracing::error!("Unexpected failure: {}", message);
            } else {
                let _ = writeln!(logging::stderr(), "Unexpected failure: {}", message);
            }
            return EXIT_FAILURE;
        }
    };

    match result {
        Ok(status) => status,
        Err(LaunchError::Usage(line)) => {
            let _ = writeln!(logging::stderr(), "{}", line);
            EXIT_FAILURE
        }
        Err(LaunchError::Fatal(e)) => {
            if logging::is_initialized() {
                tracing::error!("{:?}", e);
            } else {
                let _ = writeln!(logging::stderr(), "{:?}", e);
            }
            EXIT_FAILURE
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "panic"
    }
}

fn run<I, T>(argv: I, host: &dyn HostEnvironment, config_manager: &ConfigManager) -> Result<i32, LaunchError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = StartupArguments::parse_from(argv)?;
    let decision = ModeResolver::resolve(&args, host);

    match decision {
        ExecutionDecision::PrintHelp => {
            let revision = revision_for_display(config_manager);
            print(format!(
                "{}\n\n{}",
                about::application_identifier(revision),
                StartupArguments::usage()
            ))?;
            return Ok(EXIT_SUCCESS);
        }
        ExecutionDecision::PrintVersion => {
            print(about::version_line(revision_for_display(config_manager)))?;
            return Ok(EXIT_SUCCESS);
        }
        _ => {}
    }

    let config = config_manager.load()?;
    let folders = AppFolders::resolve(&config)?;

    if let ExecutionDecision::ClearData(targets) = decision {
        if let Err(e) = logging::init_console(LevelFilter::INFO) {
            tracing::debug!("Console logging not installed: {}", e);
        }
        return Ok(maintenance::run(targets, host, &folders));
    }

    let _logging = initialize(&args, &config, &folders)?;

    match decision {
        ExecutionDecision::RunCli => Ok(ArgumentProcessor::new(&config, &folders).run(&args)),
        ExecutionDecision::RunGuiHeadlessRefused => {
            print(format!(
                "{} / {} (headless)\n\n{}",
                about::application_identifier(config.revision),
                about::runtime_identifier(),
                StartupArguments::usage()
            ))?;
            Ok(EXIT_FAILURE)
        }
        _ => run_gui(&args, &config, &folders, host),
    }
}

/// Process-wide initialization shared by the command-line and GUI paths
fn initialize(
    args: &StartupArguments,
    config: &AppConfig,
    folders: &AppFolders,
) -> Result<Option<LoggingGuard>, LaunchError> {
    environment::initialize(args, config, folders)?;

    let guard = match logging::init(args, folders) {
        Ok(guard) => Some(guard),
        Err(LoggingError::AlreadyInitialized) => {
            tracing::debug!("Logging already initialized");
            None
        }
        Err(e) => return Err(anyhow::Error::from(e).context("Failed to initialize logging").into()),
    };

    tracing::info!("Starting {} v{}", crate::APP_NAME, crate::VERSION);

    let cache = CacheManager::initialize(folders.cache());
    tracing::debug!("Cache folder: {}", cache.root());

    environment::install_sandbox();

    let history = HistorySpooler::initialize(&folders.history_file());
    let app_settings = Settings::open(folders.settings(), APP_SETTINGS_SCOPE)?;
    let persistent = app_settings
        .entry(HISTORY_PERSISTENT_KEY)
        .default_value("true")
        .as_bool();
    history.set_persistent_history_enabled(persistent);
    tracing::debug!("History {} (persistent: {})", history.path(), persistent);

    Ok(guard)
}

fn run_gui(
    args: &StartupArguments,
    config: &AppConfig,
    folders: &AppFolders,
    host: &dyn HostEnvironment,
) -> Result<i32, LaunchError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("reelname-worker")
        .build()
        .context("Failed to create tokio runtime")?;

    let metrics = Arc::new(StartupMetrics::new());

    let bootstrap = GuiBootstrap::new(args, config, folders, host, runtime.handle().clone(), metrics)
        .map_err(|e| match e.downcast_ref::<ConfigurationError>() {
            Some(illegal) => LaunchError::Usage(illegal.to_string()),
            None => LaunchError::Fatal(e),
        })?;

    let result = bootstrap.run();

    tracing::info!("GUI closed, shutting down");

    // Background tasks carry no cancellation; abandon whatever is left
    runtime.shutdown_background();

    result?;
    Ok(EXIT_SUCCESS)
}

/// Revision shown by help and version, which must not fail on a bad config
fn revision_for_display(config_manager: &ConfigManager) -> u32 {
    config_manager
        .load()
        .map(|config| config.revision)
        .unwrap_or_else(|_| AppConfig::default().revision)
}

fn print(text: String) -> Result<(), LaunchError> {
    let mut out = logging::stdout();
    writeln!(out, "{}", text)
        .and_then(|()| out.flush())
        .context("Failed to write to standard output")?;
    Ok(())
}
