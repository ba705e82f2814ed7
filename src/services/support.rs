//! Support prompt offered when the rename count reaches a milestone.

use crate::settings::Settings;
use anyhow::Result;

pub const SUPPORT_MILESTONE_KEY: &str = "support.milestone";

pub const MILESTONES: [usize; 5] = [100, 1_000, 5_000, 10_000, 50_000];

/// Highest milestone reached by `total` that is above `recorded`
pub fn pending_milestone(total: usize, recorded: usize) -> Option<usize> {
    MILESTONES
        .iter()
        .rev()
        .copied()
        .find(|milestone| *milestone <= total && *milestone > recorded)
}

pub struct SupportPrompt {
    settings: Settings,
}

impl SupportPrompt {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    fn recorded(&self) -> usize {
        self.settings
            .get(SUPPORT_MILESTONE_KEY)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Offer the prompt when a new milestone is reached.
    ///
    /// The milestone is recorded before `offer` runs. Returns the milestone offered.
    pub fn maybe_offer<F>(&self, total: usize, offer: F) -> Result<Option<usize>>
    where
        F: FnOnce(usize) -> Result<()>,
    {
        let Some(milestone) = pending_milestone(total, self.recorded()) else {
            return Ok(None);
        };

        self.settings
            .put(SUPPORT_MILESTONE_KEY, milestone.to_string());
        self.settings.flush()?;

        offer(milestone)?;
        Ok(Some(milestone))
    }
}
