//! Data models shared by the launcher, the background tasks and the interactive shell.
//!
//! - [`AppConfig`]: Application configuration (folders, update source, suppression switches)
//! - [`WindowGeometry`]: Persisted main window rectangle with restore/persist rules
//! - [`UpdateInfo`]: Flat record parsed from the update descriptor
//! - [`BuildRevision`]: Running build revision and the development-build sentinel

pub mod config;
pub mod geometry;
pub mod update;

pub use config::AppConfig;
pub use geometry::{GeometryError, WindowGeometry};
pub use update::{BuildRevision, UpdateCheckError, UpdateInfo};
