//! reelname - desktop and command-line media renamer
//!
//! Thin binary entry point. Argument resolution, environment setup, logging,
//! and the choice between command-line and interactive execution all live in
//! [`reelname::launcher`].

use std::process::ExitCode;

fn main() -> ExitCode {
    let status = reelname::launcher::launch(std::env::args_os(), &reelname::SystemHost);

    ExitCode::from(u8::try_from(status).unwrap_or(1))
}
