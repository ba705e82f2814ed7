// GUI Bootstrap - builds the main window and owns its lifecycle
//
// Order of construction, all on the event loop thread:
// 1. theme and panel selection (an empty panel filter fails before any window exists)
// 2. main window creation and geometry restore
// 3. platform integration (help menu, full screen toggle, window icon)
// 4. callbacks, notification forwarding and the close handler
// 5. show, then hand the startup tasks to a background worker

use super::bridge::{EventLoopBridge, EventLoopBridgeHandle};
use super::panels::{PanelRegistry, WindowLayout};
use super::platform::{PlatformIntegration, PlatformKind};
use super::surface::{self, SlintSurface, UpdateAction};
use super::theme::VisualTheme;
use super::window::{self, SlintWindowHandle};
use crate::args::StartupArguments;
use crate::cache::CacheManager;
use crate::config::AppFolders;
use crate::environment::{HostEnvironment, RuntimeProperties};
use crate::history::HistorySpooler;
use crate::logging;
use crate::metrics::StartupMetrics;
use crate::models::{AppConfig, WindowGeometry};
use crate::services::background::{self, StartupContext};
use crate::services::{HttpDescriptorSource, InteractiveSurface, ShutdownSequence, UpdateCheck};
use crate::settings::Settings;
use crate::{APP_SETTINGS_SCOPE, WINDOW_SETTINGS_SCOPE};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use slint::{ModelRc, SharedString, VecModel};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

// Include the generated Slint code
slint::include_modules!();

pub const HELP_URL: &str = "https://www.reelname.net/manual";

/// Owner of the main window from construction until the event loop ends
///
/// # Example
/// ```ignore
/// let bootstrap = GuiBootstrap::new(&args, &config, &folders, &host, runtime.handle().clone(), metrics)?;
/// bootstrap.run()?; // returns once the window has been closed
/// ```
pub struct GuiBootstrap {
    ui: MainWindow,
    bridge: EventLoopBridge<MainWindow>,
    context: StartupContext,
    metrics: Arc<StartupMetrics>,
}

impl GuiBootstrap {
    pub fn new(
        args: &StartupArguments,
        config: &AppConfig,
        folders: &AppFolders,
        host: &dyn HostEnvironment,
        tokio_handle: tokio::runtime::Handle,
        metrics: Arc<StartupMetrics>,
    ) -> Result<Self> {
        let theme = VisualTheme::select(config.portable);
        let panels = PanelRegistry::default_sequence().filter(args.mode.as_deref())?;
        let layout = WindowLayout::for_panels(&panels);
        tracing::debug!("Theme {:?}, layout {:?}, panels {:?}", theme, layout, panels.names());

        let ui = MainWindow::new().context("Failed to create main window")?;
        Self::apply_panels(&ui, &panels, layout);
        ui.set_bundled_theme(theme.is_bundled());

        let window_settings = Settings::open(folders.settings(), WINDOW_SETTINGS_SCOPE)?;
        let app_settings = Settings::open(folders.settings(), APP_SETTINGS_SCOPE)?;
        window::apply_geometry(&ui, WindowGeometry::restore_or_default(&window_settings));

        let integration = PlatformIntegration::resolve(PlatformKind::detect(host), host);
        Self::apply_platform(&ui, &integration);

        let bridge = EventLoopBridge::new(&ui, tokio_handle);
        Self::setup_callbacks(&ui);
        Self::setup_notifications(&bridge.clone_handle());
        Self::setup_close_handler(&ui, window_settings, app_settings.clone(), Arc::clone(&metrics));

        let cache = CacheManager::get()
            .map(|manager| manager.cache("web-xml"))
            .unwrap_or_else(|_| CacheManager::new(folders.cache()).cache("web-xml"));
        let update_check = UpdateCheck::new(
            Arc::new(HttpDescriptorSource::new(RuntimeProperties::current())),
            cache,
            config.update_url.clone(),
            config.build_revision(),
        );

        let context = StartupContext {
            files: args.files.clone(),
            app_settings,
            skip_getting_started: config.skip_getting_started,
            skip_update_check: config.skip_update_check,
            update_check,
        };

        tracing::info!("GUI bootstrap complete");

        Ok(Self {
            ui,
            bridge,
            context,
            metrics,
        })
    }

    /// Show the window, start the deferred tasks and run the event loop
    /// until the close handler ends it.
    pub fn run(self) -> Result<()> {
        let Self {
            ui,
            bridge,
            context,
            metrics,
        } = self;

        ui.show().context("Failed to show main window")?;

        let handle = bridge.clone_handle();
        let surface: Arc<dyn InteractiveSurface> = Arc::new(SlintSurface::new(handle.clone()));
        let queue = background::startup_tasks(context, surface, Arc::clone(&metrics));
        let _tasks = background::spawn(handle.tokio_handle(), queue, metrics);

        tracing::info!("Starting GUI event loop");
        slint::run_event_loop_until_quit().context("GUI event loop failed")?;

        drop(ui);
        Ok(())
    }

    fn apply_panels(ui: &MainWindow, panels: &PanelRegistry, layout: WindowLayout) {
        let names: Vec<SharedString> = panels
            .panels()
            .iter()
            .map(|panel| SharedString::from(panel.name))
            .collect();
        let titles: Vec<SharedString> = panels
            .panels()
            .iter()
            .map(|panel| SharedString::from(panel.title))
            .collect();

        ui.set_panel_names(ModelRc::new(VecModel::from(names)));
        ui.set_panel_titles(ModelRc::new(VecModel::from(titles)));
        ui.set_multi_panel(layout == WindowLayout::MultiPanel);
        ui.set_current_panel(0);
    }

    fn apply_platform(ui: &MainWindow, integration: &PlatformIntegration) {
        tracing::debug!("Platform integration {:?}", integration);
        ui.set_help_menu(integration.help_menu);
        ui.set_fullscreen_toggle(integration.fullscreen);

        // Without an icon the window manager falls back to its default
        if integration.window_icons {
            ui.set_window_icon(ui.get_bundled_icon());
        }
    }

    fn setup_callbacks(ui: &MainWindow) {
        let ui_weak = ui.as_weak();
        ui.on_open_files(move || {
            let Some(files) = Self::show_file_picker("Open files") else {
                return;
            };
            if let Some(ui) = ui_weak.upgrade() {
                surface::add_opened_files(&ui, files);
            }
        });

        ui.on_show_help(|| {
            if let Err(e) = super::browser::open_url(HELP_URL) {
                tracing::warn!("{:#}", e);
            }
        });

        let ui_weak = ui.as_weak();
        ui.on_toggle_fullscreen(move || {
            if let Some(ui) = ui_weak.upgrade() {
                let window = ui.window();
                window.set_fullscreen(!window.is_fullscreen());
            }
        });

        let ui_weak = ui.as_weak();
        ui.on_dismiss_notification(move || {
            if let Some(ui) = ui_weak.upgrade() {
                ui.set_show_notification(false);
            }
        });

        let ui_weak = ui.as_weak();
        ui.on_update_download(move || {
            if let Some(ui) = ui_weak.upgrade() {
                surface::handle_update_action(&ui, UpdateAction::Download);
            }
        });

        let ui_weak = ui.as_weak();
        ui.on_update_details(move || {
            if let Some(ui) = ui_weak.upgrade() {
                surface::handle_update_action(&ui, UpdateAction::Details);
            }
        });

        let ui_weak = ui.as_weak();
        ui.on_update_ignore(move || {
            if let Some(ui) = ui_weak.upgrade() {
                surface::handle_update_action(&ui, UpdateAction::Ignore);
            }
        });

        tracing::debug!("UI callbacks configured");
    }

    /// Forward WARN/ERROR log records to the notification line
    fn setup_notifications(bridge: &EventLoopBridgeHandle<MainWindow>) {
        let mut receiver = logging::notifications().subscribe();
        let bridge = bridge.clone();

        bridge.clone().spawn_async(move || async move {
            loop {
                let notification = match receiver.recv().await {
                    Ok(notification) => notification,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!("Skipped {} notifications", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                let severe = notification.level == tracing::Level::ERROR;
                let text = SharedString::from(notification.message.as_str());
                let queued = bridge.update_ui(move |ui| {
                    ui.set_notification_text(text);
                    ui.set_notification_severe(severe);
                    ui.set_show_notification(true);
                });

                // Logging a failure here would feed this loop again
                if queued.is_err() {
                    break;
                }
            }
        });
    }

    fn setup_close_handler(
        ui: &MainWindow,
        window_settings: Settings,
        app_settings: Settings,
        metrics: Arc<StartupMetrics>,
    ) {
        let ui_weak = ui.as_weak();

        ui.window().on_close_requested(move || {
            tracing::info!("Close requested");

            let Some(ui) = ui_weak.upgrade() else {
                window::finish_event_loop();
                return slint::CloseRequestResponse::HideWindow;
            };

            let handle = SlintWindowHandle::capture(&ui);
            let shutdown =
                ShutdownSequence::new(HistorySpooler::get(), &window_settings, app_settings.clone());
            let report = shutdown.run(&handle);
            tracing::debug!("Shutdown report {:?}", report);
            metrics.log_summary();

            // An open support prompt ends the event loop when it is dismissed
            if report.support_offered.is_none() {
                window::finish_event_loop();
            }

            slint::CloseRequestResponse::HideWindow
        });
    }

    fn show_file_picker(title: &str) -> Option<Vec<Utf8PathBuf>> {
        use rfd::FileDialog;

        let picked = FileDialog::new().set_title(title).pick_files()?;
        let files: Vec<Utf8PathBuf> = picked
            .into_iter()
            .filter_map(|path| {
                Utf8PathBuf::try_from(path)
                    .map_err(|e| {
                        tracing::error!("Failed to convert path to UTF-8: {}", e);
                        e
                    })
                    .ok()
            })
            .collect();

        (!files.is_empty()).then_some(files)
    }
}
