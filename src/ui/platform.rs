// Desktop platform integration
//
// Each platform gets its own branch. Integration is best effort: failures
// are logged and never change how startup proceeds.

use crate::environment::HostEnvironment;

pub const UBUNTU_MENU_PROXY: &str = "UBUNTU_MENUPROXY";

/// Application user model id grouping taskbar entries on Windows
pub const APP_USER_MODEL_ID: &str = "net.reelname.ReelName";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    Mac,
    Ubuntu,
    Windows,
    Generic,
}

impl PlatformKind {
    pub fn detect(host: &dyn HostEnvironment) -> Self {
        if cfg!(target_os = "macos") {
            PlatformKind::Mac
        } else if cfg!(target_os = "windows") {
            PlatformKind::Windows
        } else if host.var("XDG_CURRENT_DESKTOP").is_some_and(|desktop| desktop.contains("Unity"))
            || host.var(UBUNTU_MENU_PROXY).is_some()
        {
            PlatformKind::Ubuntu
        } else {
            PlatformKind::Generic
        }
    }
}

/// What the main window should enable for the current platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformIntegration {
    pub kind: PlatformKind,
    pub help_menu: bool,
    pub fullscreen: bool,
    pub window_icons: bool,
}

impl PlatformIntegration {
    pub fn resolve(kind: PlatformKind, host: &dyn HostEnvironment) -> Self {
        match kind {
            PlatformKind::Mac => Self {
                kind,
                help_menu: true,
                fullscreen: true,
                window_icons: false,
            },
            PlatformKind::Ubuntu => Self {
                kind,
                help_menu: host
                    .var(UBUNTU_MENU_PROXY)
                    .is_some_and(|value| value != "0"),
                fullscreen: false,
                window_icons: true,
            },
            PlatformKind::Windows => {
                tracing::debug!("Application user model id {}", APP_USER_MODEL_ID);
                Self {
                    kind,
                    help_menu: false,
                    fullscreen: false,
                    window_icons: true,
                }
            }
            PlatformKind::Generic => Self {
                kind,
                help_menu: false,
                fullscreen: false,
                window_icons: true,
            },
        }
    }
}
