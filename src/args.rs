// Startup arguments
//
// The built-in clap help and version handling is disabled: both flags are
// plain inputs to the mode resolver so that every invocation goes through the
// same decision path.

use camino::Utf8PathBuf;
use clap::{CommandFactory, Parser, ValueEnum};
use std::ffi::OsString;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

/// Command line could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("{0}")]
    Invalid(String),
}

/// Minimum severity of log records in command-line mode
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Headless command-line actions
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliAction {
    /// Print the given files, expanding folders
    List,
    /// Print identifiers and the application folder layout
    Sysinfo,
    /// Print the persisted rename history
    History,
}

/// Resolved command-line intent, fixed for the lifetime of the process
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(
    name = "reelname",
    about = "Rename and organize media files",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct StartupArguments {
    /// Print usage and exit
    #[arg(short = 'h', long)]
    pub help: bool,

    /// Print version information and exit
    #[arg(short = 'V', long)]
    pub version: bool,

    /// Delete all cached documents
    #[arg(long)]
    pub clear_cache: bool,

    /// Reset all preferences
    #[arg(long)]
    pub clear_data: bool,

    /// Run a headless action instead of the interactive window
    #[arg(long, value_enum, value_name = "ACTION")]
    pub action: Option<CliAction>,

    /// Only show panels whose name matches this pattern
    #[arg(long, value_name = "PATTERN")]
    pub mode: Option<String>,

    /// Log level in command-line mode
    #[arg(long, value_enum, default_value_t = LogLevel::Info, value_name = "LEVEL")]
    pub log: LogLevel,

    /// Copy standard output and error into this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<Utf8PathBuf>,

    /// Fail if another process already holds the log file
    #[arg(long)]
    pub log_lock: bool,

    /// Use strict unix file name semantics
    #[arg(long)]
    pub unixfs: bool,

    /// Do not read or write extended file attributes
    #[arg(long)]
    pub disable_xattr: bool,

    /// Files to open
    #[arg(value_name = "FILES")]
    pub files: Vec<Utf8PathBuf>,
}

impl StartupArguments {
    /// Parse process arguments, the first item being the program name
    pub fn parse_from<I, T>(argv: I) -> Result<Self, ArgumentError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(argv).map_err(|e| ArgumentError::Invalid(first_line(&e)))
    }

    /// Rendered usage text
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }

    /// Whether a headless action was requested
    pub fn run_cli(&self) -> bool {
        self.action.is_some()
    }

    pub fn clear_requested(&self) -> bool {
        self.clear_cache || self.clear_data
    }
}

fn first_line(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let line = rendered.lines().next().unwrap_or_default().trim();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<StartupArguments, ArgumentError> {
        StartupArguments::parse_from(std::iter::once("reelname").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_arguments() {
        let args = parse(&[]).unwrap();
        assert_eq!(args, StartupArguments::default());
        assert!(!args.run_cli());
        assert_eq!(args.log, LogLevel::Info);
    }

    #[test]
    fn test_flags_and_files() {
        let args = parse(&[
            "--action",
            "list",
            "--log",
            "debug",
            "--log-file",
            "run.log",
            "--log-lock",
            "--mode",
            "Rename|SFV",
            "a.mkv",
            "b.srt",
        ])
        .unwrap();

        assert_eq!(args.action, Some(CliAction::List));
        assert!(args.run_cli());
        assert_eq!(args.log.as_filter(), LevelFilter::DEBUG);
        assert_eq!(args.log_file.as_deref().map(|p| p.as_str()), Some("run.log"));
        assert!(args.log_lock);
        assert_eq!(args.mode.as_deref(), Some("Rename|SFV"));
        assert_eq!(args.files.len(), 2);
    }

    #[test]
    fn test_help_and_version_are_plain_flags() {
        let args = parse(&["-h", "-V", "--clear-cache"]).unwrap();
        assert!(args.help);
        assert!(args.version);
        assert!(args.clear_requested());
    }

    #[test]
    fn test_unknown_flag_is_one_line() {
        let Err(ArgumentError::Invalid(message)) = parse(&["--bogus"]) else {
            panic!("expected an argument error");
        };
        assert!(message.contains("--bogus"));
        assert!(!message.contains('\n'));
        assert!(!message.starts_with("error:"));
    }

    #[test]
    fn test_usage_lists_flags() {
        let usage = StartupArguments::usage();
        assert!(usage.contains("--clear-cache"));
        assert!(usage.contains("--log-file"));
    }
}
