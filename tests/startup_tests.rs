//! End-to-end tests of the launcher through its exit status
//!
//! These tests verify:
//! - Help and version exit 0 without touching the filesystem
//! - Illegal arguments exit 1
//! - Command-line actions run after initialization
//! - A GUI start without display is refused

mod common;

use common::{FakeHost, config_manager, temp_root};
use reelname::launcher::launch_with;
use reelname::{EXIT_FAILURE, EXIT_SUCCESS};
use std::fs;

#[test]
fn test_help_exits_zero() {
    let (_temp_dir, root) = temp_root();
    let manager = config_manager(&root);

    let status = launch_with(["reelname", "--help"], &FakeHost::desktop(), &manager);

    assert_eq!(status, EXIT_SUCCESS);
    assert!(!root.join("data").exists());
}

#[test]
fn test_version_exits_zero() {
    let (_temp_dir, root) = temp_root();
    let manager = config_manager(&root);

    let status = launch_with(["reelname", "-V"], &FakeHost::headless(), &manager);

    assert_eq!(status, EXIT_SUCCESS);
}

#[test]
fn test_help_wins_over_clear() {
    let (_temp_dir, root) = temp_root();
    let manager = config_manager(&root);
    let cache_folder = root.join("data").join("cache").join("web-xml");
    fs::create_dir_all(&cache_folder).unwrap();

    let status = launch_with(
        ["reelname", "--clear-cache", "--help"],
        &FakeHost::desktop(),
        &manager,
    );

    assert_eq!(status, EXIT_SUCCESS);
    assert!(cache_folder.exists());
}

#[test]
fn test_unknown_flag_exits_one() {
    let (_temp_dir, root) = temp_root();
    let manager = config_manager(&root);

    let status = launch_with(["reelname", "--frobnicate"], &FakeHost::desktop(), &manager);

    assert_eq!(status, EXIT_FAILURE);
}

#[test]
fn test_list_action_runs() {
    let (_temp_dir, root) = temp_root();
    let manager = config_manager(&root);
    let media = root.join("media");
    fs::create_dir_all(&media).unwrap();
    fs::write(media.join("movie.mkv"), b"").unwrap();

    let status = launch_with(
        ["reelname", "--action", "list", media.as_str()],
        &FakeHost::headless(),
        &manager,
    );

    assert_eq!(status, EXIT_SUCCESS);
    assert!(root.join("tmp").exists());
}

#[test]
fn test_list_missing_file_exits_one() {
    let (_temp_dir, root) = temp_root();
    let manager = config_manager(&root);
    let missing = root.join("missing.mkv");

    let status = launch_with(
        ["reelname", "--action", "list", missing.as_str()],
        &FakeHost::headless(),
        &manager,
    );

    assert_eq!(status, EXIT_FAILURE);
}

#[test]
fn test_headless_gui_refused() {
    let (_temp_dir, root) = temp_root();
    let manager = config_manager(&root);

    let status = launch_with(["reelname"], &FakeHost::headless(), &manager);

    assert_eq!(status, EXIT_FAILURE);
}

#[test]
fn test_unattended_clear_refused() {
    let (_temp_dir, root) = temp_root();
    let manager = config_manager(&root);
    let cache_folder = root.join("data").join("cache").join("web-xml");
    fs::create_dir_all(&cache_folder).unwrap();

    let status = launch_with(["reelname", "--clear-cache"], &FakeHost::unattended(), &manager);

    assert_eq!(status, EXIT_FAILURE);
    assert!(cache_folder.exists());
}

#[test]
fn test_attended_clear_cache() {
    let (_temp_dir, root) = temp_root();
    let manager = config_manager(&root);
    let cache_folder = root.join("data").join("cache").join("web-xml");
    fs::create_dir_all(&cache_folder).unwrap();

    let status = launch_with(["reelname", "--clear-cache"], &FakeHost::desktop(), &manager);

    assert_eq!(status, EXIT_SUCCESS);
    assert!(!cache_folder.exists());
}
