// Headless command-line actions
//
// Output goes through the stdout tee so --log-file captures it.

use crate::about;
use crate::args::{CliAction, StartupArguments};
use crate::config::AppFolders;
use crate::history::HistorySpooler;
use crate::logging;
use crate::models::AppConfig;
use crate::services::MediaTypes;
use crate::{EXIT_FAILURE, EXIT_SUCCESS};
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io::Write;

/// Runs a [`CliAction`] and maps the outcome to an exit status
pub struct ArgumentProcessor<'a> {
    config: &'a AppConfig,
    folders: &'a AppFolders,
}

impl<'a> ArgumentProcessor<'a> {
    pub fn new(config: &'a AppConfig, folders: &'a AppFolders) -> Self {
        Self { config, folders }
    }

    pub fn run(&self, args: &StartupArguments) -> i32 {
        self.run_to(args, &mut logging::stdout())
    }

    /// Run with output written to `out`
    pub fn run_to(&self, args: &StartupArguments, out: &mut dyn Write) -> i32 {
        let result = match args.action {
            Some(CliAction::List) => self.list(&args.files, out),
            Some(CliAction::Sysinfo) => self.sysinfo(out),
            Some(CliAction::History) => self.history(out),
            None => Err(anyhow::anyhow!("No action given")),
        };

        let flushed = out.flush();

        match result.and(flushed.map_err(Into::into)) {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => {
                let _ = writeln!(logging::stderr(), "{:#}", e);
                tracing::debug!("Command-line action failed: {:?}", e);
                EXIT_FAILURE
            }
        }
    }

    fn list(&self, files: &[Utf8PathBuf], out: &mut dyn Write) -> Result<()> {
        let missing: Vec<&Utf8PathBuf> = files.iter().filter(|file| !file.exists()).collect();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|file| file.as_str()).collect();
            bail!("File not found: {}", names.join(", "));
        }

        let mut resolved = Vec::new();
        for file in files {
            collect_files(file, &mut resolved)?;
        }

        let types = MediaTypes::get_default()?;
        for file in resolved {
            match types.category(&file) {
                Some(category) => writeln!(out, "{}\t{}", file, category.name())?,
                None => writeln!(out, "{}", file)?,
            }
        }
        Ok(())
    }

    fn sysinfo(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", about::application_identifier(self.config.revision))?;
        writeln!(out, "Runtime: {}", about::runtime_identifier())?;
        writeln!(out, "System: {}", about::system_identifier())?;
        writeln!(out, "Application data: {}", self.folders.app_data())?;
        writeln!(out, "Cache: {}", self.folders.cache())?;
        writeln!(out, "Logs: {}", self.folders.logs())?;
        writeln!(out, "Settings: {}", self.folders.settings())?;
        writeln!(out, "Temp: {}", self.folders.temp())?;
        Ok(())
    }

    fn history(&self, out: &mut dyn Write) -> Result<()> {
        let records = match HistorySpooler::get() {
            Some(spooler) => spooler.load()?,
            None => HistorySpooler::new(self.folders.history_file()).load()?,
        };

        for record in &records {
            writeln!(out, "{} -> {}", record.from, record.to)?;
        }
        writeln!(out, "{} renamed files", records.len())?;
        Ok(())
    }
}

fn collect_files(path: &Utf8Path, resolved: &mut Vec<Utf8PathBuf>) -> Result<()> {
    if !path.is_dir() {
        resolved.push(path.to_path_buf());
        return Ok(());
    }

    let mut children = Vec::new();
    for entry in fs::read_dir(path).with_context(|| format!("Failed to list {}", path))? {
        let child = Utf8PathBuf::try_from(entry?.path())
            .with_context(|| format!("Non UTF-8 file name in {}", path))?;
        children.push(child);
    }
    children.sort();

    for child in children {
        collect_files(&child, resolved)?;
    }
    Ok(())
}
