// Visual theme selection

/// Look of the interactive windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualTheme {
    /// Platform style
    Native,
    /// Bundled cross-platform style, identical everywhere
    Bundled,
}

impl VisualTheme {
    /// Portable packages always use the bundled theme
    pub fn select(portable: bool) -> Self {
        if portable {
            VisualTheme::Bundled
        } else {
            VisualTheme::Native
        }
    }

    pub fn is_bundled(self) -> bool {
        self == VisualTheme::Bundled
    }
}
