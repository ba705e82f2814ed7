//! Services - startup and shutdown logic independent of the UI toolkit.
//!
//! Everything here talks to the window through the [`InteractiveSurface`] and
//! [`WindowHandle`] traits, so it can be exercised without a display.
//!
//! # Components
//!
//! - [`tasks`]: ordered, failure-isolated [`DeferredTask`] queue
//! - [`background`]: the startup task list run after the window is shown
//! - [`update`]: cached update check against the remote descriptor
//! - [`getting_started`]: one-time first-run guide gate
//! - [`media_types`]: extension to media category registry
//! - [`support`]: support prompt milestones
//! - [`shutdown`]: the close handler's [`ShutdownSequence`]

pub mod background;
pub mod getting_started;
pub mod media_types;
pub mod shutdown;
pub mod support;
pub mod surface;
pub mod tasks;
pub mod update;

pub use background::{StartupContext, startup_tasks};
pub use getting_started::GettingStarted;
pub use media_types::{MediaCategory, MediaTypes};
pub use shutdown::{ShutdownReport, ShutdownSequence, WindowHandle};
pub use support::SupportPrompt;
pub use surface::InteractiveSurface;
pub use tasks::{DeferredTask, TaskOutcome, TaskQueue, TaskReport};
pub use update::{DescriptorSource, HttpDescriptorSource, UpdateCheck, UpdateOutcome};
