//! Integration tests for argument parsing and mode resolution
//!
//! These tests verify:
//! - Every flag family reaches StartupArguments
//! - One-line argument errors
//! - Decision priority for any combination of flags and host state

mod common;

use common::FakeHost;
use proptest::prelude::*;
use reelname::args::ArgumentError;
use reelname::{CliAction, ClearTargets, ExecutionDecision, LogLevel, ModeResolver, StartupArguments};

fn parse(args: &[&str]) -> StartupArguments {
    let argv = std::iter::once("reelname").chain(args.iter().copied());
    StartupArguments::parse_from(argv).unwrap()
}

#[test]
fn test_parse_all_flag_families() {
    let args = parse(&[
        "--mode",
        "Rename|SFV",
        "--log",
        "debug",
        "--log-file",
        "session.log",
        "--log-lock",
        "--unixfs",
        "--disable-xattr",
        "--action",
        "list",
        "a.mkv",
        "b.srt",
    ]);

    assert_eq!(args.mode.as_deref(), Some("Rename|SFV"));
    assert_eq!(args.log, LogLevel::Debug);
    assert_eq!(args.log_file.as_ref().map(|p| p.as_str()), Some("session.log"));
    assert!(args.log_lock);
    assert!(args.unixfs);
    assert!(args.disable_xattr);
    assert_eq!(args.action, Some(CliAction::List));
    assert_eq!(args.files.len(), 2);
}

#[test]
fn test_unknown_flag_is_one_line() {
    let result = StartupArguments::parse_from(["reelname", "--no-such-flag"]);

    let Err(ArgumentError::Invalid(message)) = result else {
        panic!("expected an argument error");
    };
    assert!(!message.contains('\n'));
    assert!(message.contains("--no-such-flag"));
}

#[test]
fn test_usage_mentions_flags() {
    let usage = StartupArguments::usage();

    assert!(usage.contains("--clear-cache"));
    assert!(usage.contains("--mode"));
}

#[test]
fn test_clear_flags_combine() {
    let args = parse(&["--clear-cache", "--clear-data"]);

    assert_eq!(
        ModeResolver::resolve(&args, &FakeHost::desktop()),
        ExecutionDecision::ClearData(ClearTargets {
            cache: true,
            data: true
        })
    );
}

#[test]
fn test_cli_runs_without_display() {
    let args = parse(&["--action", "sysinfo"]);

    assert_eq!(
        ModeResolver::resolve(&args, &FakeHost::headless()),
        ExecutionDecision::RunCli
    );
}

fn resolve(flags: &[&str], headless: bool, console: bool) -> ExecutionDecision {
    let argv = std::iter::once("reelname").chain(flags.iter().copied());
    let args = StartupArguments::parse_from(argv).unwrap();
    let host = FakeHost { console, headless, ..FakeHost::default() };
    ModeResolver::resolve(&args, &host)
}

proptest! {
    #[test]
    fn prop_decision_follows_priority(
        help in any::<bool>(),
        version in any::<bool>(),
        clear_cache in any::<bool>(),
        clear_data in any::<bool>(),
        cli in any::<bool>(),
        headless in any::<bool>(),
        console in any::<bool>(),
    ) {
        let mut flags = Vec::new();
        if help { flags.push("--help"); }
        if version { flags.push("--version"); }
        if clear_cache { flags.push("--clear-cache"); }
        if clear_data { flags.push("--clear-data"); }
        if cli { flags.extend(["--action", "list"]); }

        let decision = resolve(&flags, headless, console);

        // The attached console never changes the outcome
        prop_assert_eq!(&decision, &resolve(&flags, headless, !console));

        // Help wins over everything
        if help {
            prop_assert_eq!(&decision, &ExecutionDecision::PrintHelp);
        }

        // Version wins over everything but help
        if version && !help {
            prop_assert_eq!(&decision, &ExecutionDecision::PrintVersion);
        }

        // Clear flags are carried through unchanged
        if (clear_cache || clear_data) && !help && !version {
            let targets = ClearTargets { cache: clear_cache, data: clear_data };
            prop_assert_eq!(&decision, &ExecutionDecision::ClearData(targets));
        }

        // A command-line action never needs a display
        if cli && !help && !version && !clear_cache && !clear_data {
            prop_assert_eq!(&decision, &ExecutionDecision::RunCli);
        }

        // Only the GUI looks at the display
        let gui = !help && !version && !clear_cache && !clear_data && !cli;
        if gui {
            let refused = matches!(decision, ExecutionDecision::RunGuiHeadlessRefused);
            prop_assert_eq!(refused, headless);
            prop_assert!(refused || decision == ExecutionDecision::RunGui);
        } else {
            prop_assert_eq!(&decision, &resolve(&flags, !headless, console));
        }

        // Only the two run modes continue past startup
        prop_assert_eq!(
            decision.is_terminal(),
            !matches!(decision, ExecutionDecision::RunCli | ExecutionDecision::RunGui)
        );
    }
}
