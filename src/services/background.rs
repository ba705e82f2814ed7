//! Deferred startup work run once the main window is visible.
//!
//! Order:
//! 1. publish files given on the command line
//! 2. load the media type registry
//! 3. prepare secondary dialogs (failure logged at error level)
//! 4. first-run guide, unless suppressed
//! 5. update check, unless suppressed
//!
//! The queue runs on a blocking worker of the tokio runtime, never on the
//! UI thread.

use crate::metrics::StartupMetrics;
use crate::services::getting_started::GettingStarted;
use crate::services::media_types::MediaTypes;
use crate::services::surface::InteractiveSurface;
use crate::services::tasks::{DeferredTask, TaskQueue, TaskReport};
use crate::services::update::UpdateCheck;
use crate::settings::Settings;
use camino::Utf8PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub const TASK_PUBLISH_FILES: &str = "publish-files";
pub const TASK_MEDIA_TYPES: &str = "media-types";
pub const TASK_AUXILIARY_DIALOGS: &str = "auxiliary-dialogs";
pub const TASK_GETTING_STARTED: &str = "getting-started";
pub const TASK_UPDATE_CHECK: &str = "update-check";

/// Inputs of the startup tasks
pub struct StartupContext {
    pub files: Vec<Utf8PathBuf>,
    pub app_settings: Settings,
    pub skip_getting_started: bool,
    pub skip_update_check: bool,
    pub update_check: UpdateCheck,
}

/// Build the startup task queue
pub fn startup_tasks(
    context: StartupContext,
    surface: Arc<dyn InteractiveSurface>,
    metrics: Arc<StartupMetrics>,
) -> TaskQueue {
    let StartupContext {
        files,
        app_settings,
        skip_getting_started,
        skip_update_check,
        update_check,
    } = context;

    let mut queue = TaskQueue::new();

    {
        let surface = Arc::clone(&surface);
        let metrics = Arc::clone(&metrics);
        queue.push(DeferredTask::new(TASK_PUBLISH_FILES, move || {
            if files.is_empty() {
                return Ok(());
            }
            let count = files.len();
            surface.publish_files(files)?;
            metrics.record_files_published(count);
            Ok(())
        }));
    }

    queue.push(DeferredTask::new(TASK_MEDIA_TYPES, || {
        let types = MediaTypes::get_default()?;
        tracing::debug!("Loaded {} media types", types.len());
        Ok(())
    }));

    {
        let surface = Arc::clone(&surface);
        queue.push(
            DeferredTask::new(TASK_AUXILIARY_DIALOGS, move || surface.init_auxiliary_dialogs())
                .severe(),
        );
    }

    if skip_getting_started {
        tracing::debug!("Getting started guide suppressed");
    } else {
        let surface = Arc::clone(&surface);
        queue.push(DeferredTask::new(TASK_GETTING_STARTED, move || {
            let shown = GettingStarted::new(app_settings).show_once(|| surface.show_getting_started())?;
            if shown {
                tracing::info!("Showing getting started guide");
            }
            Ok(())
        }));
    }

    if skip_update_check {
        tracing::debug!("Update check suppressed");
    } else {
        queue.push(DeferredTask::new(TASK_UPDATE_CHECK, move || {
            let outcome = update_check.run(surface.as_ref(), &metrics)?;
            tracing::debug!("Update check finished: {:?}", outcome);
            Ok(())
        }));
    }

    queue
}

/// Run the queue on a blocking worker
pub fn spawn(handle: &Handle, queue: TaskQueue, metrics: Arc<StartupMetrics>) -> JoinHandle<TaskReport> {
    handle.spawn_blocking(move || {
        let report = queue.run_all(&metrics);
        tracing::debug!(
            "Deferred startup tasks finished, {} failed",
            report.failed().len()
        );
        report
    })
}
