// UI module - main window bootstrap and event loop bridge
//
// This module contains:
// - GuiBootstrap: builds the main window, wires callbacks and owns the close handler
// - EventLoopBridge: forwards work from background workers to the Slint event loop
// - panels/platform/theme: decisions made before the window exists

pub mod bridge;
pub mod browser;
pub mod controller;
pub mod panels;
pub mod platform;
pub mod surface;
pub mod theme;
pub mod window;

pub use bridge::{EventLoopBridge, EventLoopBridgeHandle};
pub use controller::GuiBootstrap;
pub use panels::{ConfigurationError, PanelDescriptor, PanelRegistry, WindowLayout};
pub use platform::{PlatformIntegration, PlatformKind};
pub use theme::VisualTheme;
