//! First-run guide gate.
//!
//! The `getting.started` flag is written and flushed before the guide is
//! shown, so a crash while showing it never brings it back.

use crate::settings::Settings;
use anyhow::Result;

pub const GETTING_STARTED_KEY: &str = "getting.started";

pub struct GettingStarted {
    settings: Settings,
}

impl GettingStarted {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn already_shown(&self) -> bool {
        self.settings
            .entry(GETTING_STARTED_KEY)
            .default_value("0")
            .value()
            != "0"
    }

    /// Run `show` unless the guide has been shown before.
    ///
    /// Returns whether `show` was called.
    pub fn show_once<F>(&self, show: F) -> Result<bool>
    where
        F: FnOnce() -> Result<()>,
    {
        let entry = self.settings.entry(GETTING_STARTED_KEY).default_value("0");
        if entry.value() != "0" {
            return Ok(false);
        }

        entry.set_value("1");
        entry.flush()?;

        show()?;
        Ok(true)
    }
}
