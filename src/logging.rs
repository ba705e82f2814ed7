// Logging subsystem
//
// One global tracing subscriber per process:
// - console layer writing through the stderr tee
// - interactive mode only: daily rolling error log (WARN and above) and a
//   notification layer forwarding WARN/ERROR events to the window
//
// An optional log file receives a copy of every byte written to standard
// output and standard error through `stdout()` / `stderr()`.

use crate::args::StartupArguments;
use crate::config::AppFolders;
use camino::{Utf8Path, Utf8PathBuf};
use fs4::FileExt;
use std::fmt::Debug;
use std::fs::{self, File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while configuring log destinations
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to create log file {path}: {source}")]
    Create {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Log file {0} is locked by another process")]
    LockUnavailable(Utf8PathBuf),

    #[error("Logging is already initialized")]
    AlreadyInitialized,
}

/// Keeps the non-blocking log writers alive; hold until process exit
#[must_use = "dropping the guard stops background log writers"]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Whether a global subscriber has been installed by this module
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

/// Configure logging for the selected mode.
///
/// Command-line mode honors `--log`; interactive mode logs at INFO and adds
/// the error log and notification layers. A requested log file that cannot
/// be created or locked aborts initialization.
pub fn init(args: &StartupArguments, folders: &AppFolders) -> Result<LoggingGuard, LoggingError> {
    if is_initialized() {
        return Err(LoggingError::AlreadyInitialized);
    }

    if let Some(requested) = &args.log_file {
        let path = resolve_log_file(requested, folders);
        let file = open_log_file(&path, args.log_lock)?;
        install_tee(file)?;
    }

    let interactive = !args.run_cli();
    let level = if interactive {
        LevelFilter::INFO
    } else {
        args.log.as_filter()
    };

    let mut guards = Vec::new();
    let mut error_log_failure = None;

    let error_log = if interactive {
        match error_log_layer(folders.app_data()) {
            Ok((layer, guard)) => {
                guards.push(guard);
                Some(layer)
            }
            Err(e) => {
                error_log_failure = Some(e);
                None
            }
        }
    } else {
        None
    };

    let notifications = interactive.then(|| NotificationLayer::new(notifications()));

    tracing_subscriber::registry()
        .with(EnvFilter::new(level.to_string()))
        .with(console_layer())
        .with(error_log)
        .with(notifications)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    INITIALIZED.store(true, Ordering::Release);

    if let Some(e) = error_log_failure {
        tracing::warn!("Failed to create error log in {}: {}", folders.app_data(), e);
    }

    tracing::debug!(
        "Logging initialized: level={}, interactive={}, tee={}",
        level,
        interactive,
        tee().is_some()
    );

    Ok(LoggingGuard { _guards: guards })
}

/// Console-only logging for the short-circuit paths that exit before the
/// environment is initialized.
pub fn init_console(level: LevelFilter) -> Result<(), LoggingError> {
    if is_initialized() {
        return Err(LoggingError::AlreadyInitialized);
    }

    tracing_subscriber::registry()
        .with(EnvFilter::new(level.to_string()))
        .with(console_layer())
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    INITIALIZED.store(true, Ordering::Release);
    Ok(())
}

fn console_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let ansi = tee().is_none() && io::stderr().is_terminal();
    tracing_subscriber::fmt::layer()
        .with_writer(stderr)
        .with_ansi(ansi)
        .with_target(false)
}

fn error_log_layer<S>(dir: &Utf8Path) -> io::Result<(impl Layer<S>, WorkerGuard)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("error")
        .filename_suffix("log")
        .build(dir)
        .map_err(|e| io::Error::other(e.to_string()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_filter(LevelFilter::WARN);

    Ok((layer, guard))
}

/// Resolve a requested log file; relative paths land in the logs folder
pub fn resolve_log_file(requested: &Utf8Path, folders: &AppFolders) -> Utf8PathBuf {
    if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        folders.logs().join(requested)
    }
}

/// Open a log file for append, creating it and its parents.
///
/// With `lock`, an exclusive advisory lock is taken without waiting; a file
/// already locked by another writer fails with [`LoggingError::LockUnavailable`].
pub fn open_log_file(path: &Utf8Path, lock: bool) -> Result<File, LoggingError> {
    let create_error = |source| LoggingError::Create {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        fs::create_dir_all(parent).map_err(create_error)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(create_error)?;

    if lock && file.try_lock_exclusive().is_err() {
        return Err(LoggingError::LockUnavailable(path.to_path_buf()));
    }

    Ok(file)
}

static TEE: OnceLock<Mutex<File>> = OnceLock::new();

/// Route a copy of standard output and error into `file` for the rest of the process
pub fn install_tee(file: File) -> Result<(), LoggingError> {
    TEE.set(Mutex::new(file))
        .map_err(|_| LoggingError::AlreadyInitialized)
}

fn tee() -> Option<&'static Mutex<File>> {
    TEE.get()
}

static TEE_FAILED: AtomicBool = AtomicBool::new(false);

/// Whether a write to the tee file has failed in this process
pub fn tee_failed() -> bool {
    TEE_FAILED.load(Ordering::Acquire)
}

// Reported once; the primary stream keeps working either way
fn report_tee_failure(e: &io::Error) {
    if !TEE_FAILED.swap(true, Ordering::AcqRel) {
        let _ = writeln!(io::stderr(), "Failed to write log file: {}", e);
    }
}

/// Writer copying everything written to `primary` into the tee file, if any
pub struct TeeWriter<W> {
    primary: W,
    copy: Option<&'static Mutex<File>>,
}

impl<W: Write> TeeWriter<W> {
    pub fn new(primary: W, copy: Option<&'static Mutex<File>>) -> Self {
        Self { primary, copy }
    }

    pub fn into_inner(self) -> W {
        self.primary
    }
}

impl<W: Write> Write for TeeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.primary.write(buf)?;
        if let Some(copy) = self.copy {
            let mut file = copy.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = file.write_all(&buf[..written]) {
                report_tee_failure(&e);
            }
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        if let Some(copy) = self.copy {
            let mut file = copy.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = file.flush() {
                report_tee_failure(&e);
            }
        }
        Ok(())
    }
}

/// Standard output, copied into the log file when one is configured
pub fn stdout() -> TeeWriter<io::Stdout> {
    TeeWriter::new(io::stdout(), tee())
}

/// Standard error, copied into the log file when one is configured
pub fn stderr() -> TeeWriter<io::Stderr> {
    TeeWriter::new(io::stderr(), tee())
}

/// A WARN or ERROR record surfaced to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Fan-out of notifications to interested windows
#[derive(Debug)]
pub struct NotificationHub {
    sender: broadcast::Sender<Notification>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn publish(&self, notification: Notification) {
        // No subscriber yet means no window to show it in
        let _ = self.sender.send(notification);
    }
}

static HUB: OnceLock<NotificationHub> = OnceLock::new();

/// The process notification hub
pub fn notifications() -> &'static NotificationHub {
    HUB.get_or_init(|| NotificationHub::new(64))
}

/// Forwards WARN and ERROR events to a [`NotificationHub`]
pub struct NotificationLayer {
    hub: &'static NotificationHub,
}

impl NotificationLayer {
    pub fn new(hub: &'static NotificationHub) -> Self {
        Self { hub }
    }
}

impl<S: Subscriber> Layer<S> for NotificationLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level > Level::WARN {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.hub.publish(Notification {
            level,
            message: visitor.message,
        });
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}
