// Slint implementation of the interactive surface
//
// Called from background workers; every window operation is forwarded to
// the event loop through the bridge. Secondary windows live in thread-locals
// of the event loop thread.

use super::browser;
use super::controller::{GettingStartedWindow, MainWindow};
use crate::models::UpdateInfo;
use crate::services::InteractiveSurface;
use crate::ui::bridge::EventLoopBridgeHandle;
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use slint::{ComponentHandle, ModelRc, SharedString, StandardListViewItem, VecModel};
use std::cell::RefCell;

thread_local! {
    static GETTING_STARTED: RefCell<Option<GettingStartedWindow>> = const { RefCell::new(None) };
    static OPENED_FILES: RefCell<Vec<Utf8PathBuf>> = const { RefCell::new(Vec::new()) };
    static PENDING_UPDATE: RefCell<Option<UpdateInfo>> = const { RefCell::new(None) };
}

pub struct SlintSurface {
    bridge: EventLoopBridgeHandle<MainWindow>,
}

impl SlintSurface {
    pub fn new(bridge: EventLoopBridgeHandle<MainWindow>) -> Self {
        Self { bridge }
    }
}

impl InteractiveSurface for SlintSurface {
    fn publish_files(&self, files: Vec<Utf8PathBuf>) -> Result<()> {
        self.bridge.update_ui(move |ui| add_opened_files(ui, files))
    }

    fn init_auxiliary_dialogs(&self) -> Result<()> {
        self.bridge.call_ui(|_ui| create_getting_started_window())?
    }

    fn show_getting_started(&self) -> Result<()> {
        self.bridge.update_ui(|_ui| {
            GETTING_STARTED.with(|guide| match guide.borrow().as_ref() {
                Some(window) => {
                    if let Err(e) = window.show() {
                        tracing::warn!("Failed to show getting started guide: {}", e);
                    }
                }
                None => tracing::warn!("Getting started guide is unavailable"),
            });
        })
    }

    fn show_update_notice(&self, info: UpdateInfo) -> Result<()> {
        self.bridge.update_ui(move |ui| {
            ui.set_update_title(SharedString::from(info.title.as_str()));
            ui.set_update_message(SharedString::from(info.message.as_str()));
            ui.set_update_has_details(!info.discussion.is_empty());
            ui.set_show_update_dialog(true);
            PENDING_UPDATE.with(|pending| *pending.borrow_mut() = Some(info));
        })
    }
}

fn create_getting_started_window() -> Result<()> {
    let window = GettingStartedWindow::new().context("Failed to create getting started window")?;

    let weak = window.as_weak();
    window.on_close_guide(move || {
        if let Some(window) = weak.upgrade() {
            let _ = window.hide();
        }
    });

    GETTING_STARTED.with(|guide| *guide.borrow_mut() = Some(window));
    tracing::debug!("Auxiliary dialogs ready");
    Ok(())
}

/// Append files to the opened file list of the main window.
///
/// Runs on the event loop thread.
pub fn add_opened_files(ui: &MainWindow, files: Vec<Utf8PathBuf>) {
    let count = files.len();
    let all = OPENED_FILES.with(|opened| {
        let mut opened = opened.borrow_mut();
        opened.extend(files);
        opened.clone()
    });

    let items: Vec<StandardListViewItem> = all
        .iter()
        .map(|file| StandardListViewItem::from(file.as_str()))
        .collect();
    ui.set_opened_files(ModelRc::new(VecModel::from(items)));
    ui.set_opened_file_count(i32::try_from(all.len()).unwrap_or(i32::MAX));

    tracing::info!("Opened {} files", count);
}

/// Buttons of the update notice. Runs on the event loop thread.
pub fn handle_update_action(ui: &MainWindow, action: UpdateAction) {
    let info = PENDING_UPDATE.with(|pending| pending.borrow().clone());
    let Some(info) = info else {
        ui.set_show_update_dialog(false);
        return;
    };

    let link = match action {
        UpdateAction::Download => Some(info.download.as_str()),
        UpdateAction::Details => Some(info.discussion.as_str()),
        UpdateAction::Ignore => None,
    };

    if let Some(link) = link.filter(|link| !link.is_empty()) {
        if let Err(e) = browser::open_url(link) {
            tracing::warn!("{:#}", e);
        }
    }

    // Details keeps the notice open
    if action != UpdateAction::Details {
        ui.set_show_update_dialog(false);
        PENDING_UPDATE.with(|pending| *pending.borrow_mut() = None);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    Download,
    Details,
    Ignore,
}
