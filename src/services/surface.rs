//! Interactive surface seen from background tasks.
//!
//! Implementations marshal every call onto the UI thread and return as soon
//! as the work is queued; they never block the calling worker on the UI.

use crate::models::UpdateInfo;
use anyhow::Result;
use camino::Utf8PathBuf;

#[cfg_attr(test, mockall::automock)]
pub trait InteractiveSurface: Send + Sync {
    /// Post files opened from outside the window (launch arguments, file dialog)
    fn publish_files(&self, files: Vec<Utf8PathBuf>) -> Result<()>;

    /// Prepare the secondary dialog runtime
    fn init_auxiliary_dialogs(&self) -> Result<()>;

    /// Show the first-run guide
    fn show_getting_started(&self) -> Result<()>;

    /// Show the modal update notice
    fn show_update_notice(&self, info: UpdateInfo) -> Result<()>;
}
