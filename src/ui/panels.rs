//! Feature panel registry and mode filter.
//!
//! `--mode` takes a regular expression matched against the whole panel name,
//! so `--mode SFV` selects exactly the SFV panel and `--mode 'Rename|List'`
//! selects two.

use regex::Regex;
use thiserror::Error;

/// Errors in the interactive configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Illegal mode: {0}")]
    IllegalMode(String),
}

/// A feature panel of the main window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelDescriptor {
    pub name: &'static str,
    pub title: &'static str,
}

/// Ordered list of available panels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRegistry {
    panels: Vec<PanelDescriptor>,
}

impl PanelRegistry {
    pub fn new(panels: Vec<PanelDescriptor>) -> Self {
        Self { panels }
    }

    pub fn default_sequence() -> Self {
        Self::new(vec![
            PanelDescriptor {
                name: "Rename",
                title: "Rename files",
            },
            PanelDescriptor {
                name: "Episodes",
                title: "Episode lists",
            },
            PanelDescriptor {
                name: "Subtitles",
                title: "Subtitles",
            },
            PanelDescriptor {
                name: "SFV",
                title: "Checksums",
            },
            PanelDescriptor {
                name: "Filter",
                title: "Filter and split",
            },
            PanelDescriptor {
                name: "List",
                title: "Name lists",
            },
        ])
    }

    pub fn panels(&self) -> &[PanelDescriptor] {
        &self.panels
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.panels.iter().map(|panel| panel.name).collect()
    }

    /// Panels whose name matches `pattern` in full, in registry order
    pub fn filter(&self, pattern: Option<&str>) -> Result<Self, ConfigurationError> {
        let Some(pattern) = pattern else {
            return Ok(self.clone());
        };

        let regex = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|_| ConfigurationError::IllegalMode(pattern.to_string()))?;

        let panels: Vec<PanelDescriptor> = self
            .panels
            .iter()
            .filter(|panel| regex.is_match(panel.name))
            .copied()
            .collect();

        if panels.is_empty() {
            return Err(ConfigurationError::IllegalMode(pattern.to_string()));
        }

        Ok(Self::new(panels))
    }
}

/// Window arrangement for the selected panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowLayout {
    /// Panel selector plus one page per panel
    MultiPanel,
    /// One panel filling the window
    SinglePanel,
}

impl WindowLayout {
    pub fn for_panels(registry: &PanelRegistry) -> Self {
        if registry.panels().len() > 1 {
            WindowLayout::MultiPanel
        } else {
            WindowLayout::SinglePanel
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter_keeps_order() {
        let registry = PanelRegistry::default_sequence();
        let filtered = registry.filter(None).unwrap();
        assert_eq!(
            filtered.names(),
            vec!["Rename", "Episodes", "Subtitles", "SFV", "Filter", "List"]
        );
        assert_eq!(WindowLayout::for_panels(&filtered), WindowLayout::MultiPanel);
    }

    #[test]
    fn test_whole_name_match() {
        let registry = PanelRegistry::default_sequence();

        let single = registry.filter(Some("SFV")).unwrap();
        assert_eq!(single.names(), vec!["SFV"]);
        assert_eq!(WindowLayout::for_panels(&single), WindowLayout::SinglePanel);

        assert_eq!(
            registry.filter(Some("List|Rename")).unwrap().names(),
            vec!["Rename", "List"]
        );
        assert!(registry.filter(Some("Ren")).is_err());
    }

    #[test]
    fn test_empty_and_invalid_filters() {
        let registry = PanelRegistry::default_sequence();
        assert_eq!(
            registry.filter(Some("Nope")),
            Err(ConfigurationError::IllegalMode("Nope".to_string()))
        );
        assert!(matches!(
            registry.filter(Some("(")),
            Err(ConfigurationError::IllegalMode(_))
        ));
    }
}
