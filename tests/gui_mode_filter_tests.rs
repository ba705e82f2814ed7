//! A panel filter matching nothing must stop the launch before any window
//! is created, so these tests run without a display server. Platform
//! window features are checked on the values the window is built from.

mod common;

use common::{FakeHost, config_manager, temp_root};
use reelname::launcher::launch_with;
use reelname::ui::platform::UBUNTU_MENU_PROXY;
use reelname::ui::{ConfigurationError, PanelRegistry, PlatformIntegration, PlatformKind};
use reelname::EXIT_FAILURE;

#[test]
fn test_unmatched_mode_exits_one() {
    let (_temp_dir, root) = temp_root();
    let manager = config_manager(&root);

    let status = launch_with(["reelname", "--mode", "Nope"], &FakeHost::desktop(), &manager);

    assert_eq!(status, EXIT_FAILURE);
}

#[test]
fn test_invalid_mode_pattern_exits_one() {
    let (_temp_dir, root) = temp_root();
    let manager = config_manager(&root);

    let status = launch_with(["reelname", "--mode", "(Rename"], &FakeHost::desktop(), &manager);

    assert_eq!(status, EXIT_FAILURE);
}

#[test]
fn test_filter_is_whole_name_match() {
    let registry = PanelRegistry::default_sequence();

    assert!(matches!(
        registry.filter(Some("Ren")),
        Err(ConfigurationError::IllegalMode(_))
    ));
    assert_eq!(registry.filter(Some("Ren.*")).unwrap().names(), vec!["Rename"]);
    assert_eq!(registry.filter(None).unwrap().names().len(), 6);
}

#[test]
fn test_platform_window_features() {
    let host = FakeHost::desktop();

    let mac = PlatformIntegration::resolve(PlatformKind::Mac, &host);
    assert!(mac.help_menu);
    assert!(mac.fullscreen);
    assert!(!mac.window_icons);

    for kind in [PlatformKind::Ubuntu, PlatformKind::Windows, PlatformKind::Generic] {
        let integration = PlatformIntegration::resolve(kind, &host);
        assert_eq!(integration.kind, kind);
        assert!(!integration.fullscreen, "{:?}", kind);
        assert!(integration.window_icons, "{:?}", kind);
    }
}

#[test]
fn test_ubuntu_menu_proxy_enables_help_menu() {
    let mut host = FakeHost::desktop();
    host.vars.insert(UBUNTU_MENU_PROXY.to_string(), "libappmenu.so".to_string());

    if cfg!(target_os = "linux") {
        assert_eq!(PlatformKind::detect(&host), PlatformKind::Ubuntu);
    }
    assert!(PlatformIntegration::resolve(PlatformKind::Ubuntu, &host).help_menu);

    host.vars.insert(UBUNTU_MENU_PROXY.to_string(), "0".to_string());
    assert!(!PlatformIntegration::resolve(PlatformKind::Ubuntu, &host).help_menu);
}
