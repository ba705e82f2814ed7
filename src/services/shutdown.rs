//! Orderly shutdown run by the main window close handler.
//!
//! Steps, in order:
//! 1. hide the window
//! 2. commit buffered rename history (synchronous)
//! 3. offer the support prompt if a milestone was reached
//! 4. persist the window geometry unless maximized
//!
//! Failures are logged and the next step runs; the exit status is always 0.
//! The caller ends the event loop once the report is returned.

use crate::EXIT_SUCCESS;
use crate::history::HistorySpooler;
use crate::models::WindowGeometry;
use crate::services::support::SupportPrompt;
use crate::settings::Settings;
use anyhow::Result;

/// The window being closed
#[cfg_attr(test, mockall::automock)]
pub trait WindowHandle {
    fn hide(&self) -> Result<()>;

    fn geometry(&self) -> WindowGeometry;

    fn is_maximized(&self) -> bool;

    /// Show the support prompt without waiting for it
    fn offer_support(&self, milestone: usize) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    pub history_committed: usize,
    pub support_offered: Option<usize>,
    pub geometry_saved: bool,
    pub exit_code: i32,
}

pub struct ShutdownSequence<'a> {
    history: Option<&'a HistorySpooler>,
    window_settings: &'a Settings,
    support: SupportPrompt,
}

impl<'a> ShutdownSequence<'a> {
    pub fn new(
        history: Option<&'a HistorySpooler>,
        window_settings: &'a Settings,
        app_settings: Settings,
    ) -> Self {
        Self {
            history,
            window_settings,
            support: SupportPrompt::new(app_settings),
        }
    }

    pub fn run(&self, window: &dyn WindowHandle) -> ShutdownReport {
        if let Err(e) = window.hide() {
            tracing::warn!("Failed to hide window: {:#}", e);
        }

        let history_committed = match self.history {
            Some(history) => history.commit().unwrap_or_else(|e| {
                tracing::error!("Failed to commit history: {:#}", e);
                0
            }),
            None => 0,
        };

        let total = self.history.map(HistorySpooler::total_count).unwrap_or(0);
        let support_offered = self
            .support
            .maybe_offer(total, |milestone| window.offer_support(milestone))
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to offer support prompt: {:#}", e);
                None
            });

        let geometry_saved = window
            .geometry()
            .persist(self.window_settings, window.is_maximized())
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to save window geometry: {:#}", e);
                false
            });

        ShutdownReport {
            history_committed,
            support_offered,
            geometry_saved,
            exit_code: EXIT_SUCCESS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::RenameRecord;
    use camino::Utf8PathBuf;
    use mockall::Sequence;
    use tempfile::TempDir;

    fn open(root: &Utf8PathBuf, scope: &str) -> Settings {
        Settings::open(root, scope).unwrap()
    }

    #[test]
    fn test_hide_happens_first_and_geometry_is_saved() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let window_settings = open(&root, "reelname.ui");

        let mut sequence = Sequence::new();
        let mut window = MockWindowHandle::new();
        window
            .expect_hide()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(()));
        window
            .expect_geometry()
            .times(1)
            .in_sequence(&mut sequence)
            .return_const(WindowGeometry::new(200, 100, 800, 600));
        window.expect_is_maximized().return_const(false);
        window.expect_offer_support().never();

        let shutdown = ShutdownSequence::new(None, &window_settings, open(&root, "reelname"));
        let report = shutdown.run(&window);

        assert!(report.geometry_saved);
        assert_eq!(report.exit_code, 0);
        assert_eq!(
            WindowGeometry::restore(&open(&root, "reelname.ui")),
            Ok(WindowGeometry::new(200, 100, 800, 600))
        );
    }

    #[test]
    fn test_history_committed_and_milestone_offered() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let window_settings = open(&root, "reelname.ui");
        let history = HistorySpooler::new(root.join("history.yaml"));
        history.append((0..100).map(|n| RenameRecord {
            from: format!("/in/{}", n).into(),
            to: format!("/out/{}", n).into(),
            renamed_at: n,
        }));

        let mut window = MockWindowHandle::new();
        window.expect_hide().returning(|| Ok(()));
        window
            .expect_geometry()
            .return_const(WindowGeometry::DEFAULT);
        window.expect_is_maximized().return_const(true);
        window
            .expect_offer_support()
            .withf(|milestone| *milestone == 100)
            .times(1)
            .returning(|_| Ok(()));

        let shutdown =
            ShutdownSequence::new(Some(&history), &window_settings, open(&root, "reelname"));
        let report = shutdown.run(&window);

        assert_eq!(report.history_committed, 100);
        assert_eq!(report.support_offered, Some(100));
        assert!(!report.geometry_saved);
        assert!(window_settings.get(crate::models::geometry::KEY_X).is_none());
    }
}
