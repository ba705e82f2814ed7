// Maintenance actions: --clear-cache and --clear-data
//
// Both are destructive and only run when a person is at the console.

use crate::cache::CacheManager;
use crate::config::AppFolders;
use crate::environment::HostEnvironment;
use crate::mode::ClearTargets;
use crate::settings::Settings;
use crate::{EXIT_FAILURE, EXIT_SUCCESS};
use anyhow::Result;

/// Run the requested clear actions and return the process exit status
pub fn run(targets: ClearTargets, host: &dyn HostEnvironment, folders: &AppFolders) -> i32 {
    if !host.console_attached() {
        tracing::error!("`reelname --clear-cache` has been disabled due to abuse.");
        return EXIT_FAILURE;
    }

    match clear(targets, folders) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            tracing::error!("Maintenance failed: {:#}", e);
            EXIT_FAILURE
        }
    }
}

fn clear(targets: ClearTargets, folders: &AppFolders) -> Result<()> {
    if targets.data {
        tracing::info!("Reset preferences");
        let removed = Settings::clear_all(folders.settings())?;
        tracing::debug!("Removed {} settings scopes", removed);
    }

    if targets.cache {
        tracing::info!("Clear cache");
        let removed = CacheManager::new(folders.cache()).clear()?;
        tracing::debug!("Removed {} cache folders", removed);
    }

    Ok(())
}
