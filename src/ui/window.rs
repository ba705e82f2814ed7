// Main window handle used by the shutdown sequence

use super::browser;
use super::controller::{MainWindow, SupportWindow};
use crate::models::WindowGeometry;
use crate::services::WindowHandle;
use anyhow::{Context, Result};
use slint::{ComponentHandle, PhysicalPosition, PhysicalSize};
use std::cell::RefCell;

pub const SUPPORT_URL: &str = "https://www.reelname.net/support";

thread_local! {
    static SUPPORT: RefCell<Option<SupportWindow>> = const { RefCell::new(None) };
}

/// Snapshot of the main window taken when closing starts.
///
/// Geometry and maximized state are captured before the window is hidden.
pub struct SlintWindowHandle<'a> {
    ui: &'a MainWindow,
    geometry: WindowGeometry,
    maximized: bool,
}

impl<'a> SlintWindowHandle<'a> {
    pub fn capture(ui: &'a MainWindow) -> Self {
        let window = ui.window();
        let position = window.position();
        let size = window.size();

        Self {
            ui,
            geometry: WindowGeometry::new(position.x, position.y, size.width, size.height),
            maximized: window.is_maximized(),
        }
    }
}

impl WindowHandle for SlintWindowHandle<'_> {
    fn hide(&self) -> Result<()> {
        self.ui.hide().context("Failed to hide main window")
    }

    fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    fn is_maximized(&self) -> bool {
        self.maximized
    }

    fn offer_support(&self, milestone: usize) -> Result<()> {
        let window = SupportWindow::new().context("Failed to create support window")?;
        window.set_milestone(i32::try_from(milestone).unwrap_or(i32::MAX));

        let weak = window.as_weak();
        window.on_donate(move || {
            if let Err(e) = browser::open_url(SUPPORT_URL) {
                tracing::warn!("{:#}", e);
            }
            close_support(&weak);
        });

        let weak = window.as_weak();
        window.on_dismiss(move || close_support(&weak));

        window.window().on_close_requested(|| {
            finish_event_loop();
            slint::CloseRequestResponse::HideWindow
        });

        window.show().context("Failed to show support window")?;
        SUPPORT.with(|support| *support.borrow_mut() = Some(window));
        Ok(())
    }
}

fn close_support(weak: &slint::Weak<SupportWindow>) {
    if let Some(window) = weak.upgrade() {
        let _ = window.hide();
    }
    finish_event_loop();
}

/// End the event loop; the launcher then exits the process with status 0
pub fn finish_event_loop() {
    if let Err(e) = slint::quit_event_loop() {
        tracing::debug!("Event loop already stopped: {}", e);
    }
}

/// Move and resize the main window before it is first shown
pub fn apply_geometry(ui: &MainWindow, geometry: WindowGeometry) {
    let window = ui.window();
    window.set_position(PhysicalPosition::new(geometry.x, geometry.y));
    window.set_size(PhysicalSize::new(geometry.width, geometry.height));
}
