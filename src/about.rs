// Identification strings printed by --help, --version and the sysinfo action

use crate::{APP_NAME, VERSION};

/// `reelname 4.8.0 (r1234)`
pub fn application_identifier(revision: u32) -> String {
    format!("{} {} (r{})", APP_NAME, VERSION, revision)
}

/// Target family and architecture the binary was built for
pub fn runtime_identifier() -> String {
    format!(
        "Rust {} ({}-{})",
        std::env::consts::FAMILY,
        std::env::consts::ARCH,
        std::env::consts::OS
    )
}

/// Host operating system and architecture
pub fn system_identifier() -> String {
    let os = match std::env::consts::OS {
        "macos" => "macOS",
        "windows" => "Windows",
        "linux" => "Linux",
        other => other,
    };
    format!("{} {}", os, std::env::consts::ARCH)
}

/// Single line printed by `--version`
pub fn version_line(revision: u32) -> String {
    format!(
        "{} / {} / {}",
        application_identifier(revision),
        runtime_identifier(),
        system_identifier()
    )
}
