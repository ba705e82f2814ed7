use crate::settings::Settings;
use thiserror::Error;

pub const KEY_X: &str = "window.x";
pub const KEY_Y: &str = "window.y";
pub const KEY_WIDTH: &str = "window.width";
pub const KEY_HEIGHT: &str = "window.height";

/// Largest coordinate or extent accepted from the settings store
pub const MAX_EXTENT: i64 = 16_384;

/// Smallest width/height accepted from the settings store
pub const MIN_SIZE: i64 = 320;

/// Errors raised while restoring a persisted window rectangle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Window geometry key {0} is not set")]
    Missing(&'static str),

    #[error("Window geometry key {key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("Window geometry {0:?} is not on screen")]
    OffScreen(WindowGeometry),
}

/// Main window rectangle persisted under the `window.*` keys of a settings scope.
///
/// A geometry is written only on orderly close of a window that is not
/// maximized, and read back before the window is first shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl WindowGeometry {
    /// Fallback position and size, always fully on screen
    pub const DEFAULT: Self = Self {
        x: 120,
        y: 80,
        width: 1024,
        height: 720,
    };

    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle lies inside the accepted bounds
    pub fn is_on_screen(&self) -> bool {
        let x = i64::from(self.x);
        let y = i64::from(self.y);
        let width = i64::from(self.width);
        let height = i64::from(self.height);

        (0..=MAX_EXTENT).contains(&x)
            && (0..=MAX_EXTENT).contains(&y)
            && (MIN_SIZE..=MAX_EXTENT).contains(&width)
            && (MIN_SIZE..=MAX_EXTENT).contains(&height)
    }

    /// Read the persisted rectangle from a settings scope
    pub fn restore(settings: &Settings) -> Result<Self, GeometryError> {
        let geometry = Self {
            x: read_key(settings, KEY_X)?,
            y: read_key(settings, KEY_Y)?,
            width: read_key(settings, KEY_WIDTH)?,
            height: read_key(settings, KEY_HEIGHT)?,
        };

        if geometry.is_on_screen() {
            Ok(geometry)
        } else {
            Err(GeometryError::OffScreen(geometry))
        }
    }

    /// Read the persisted rectangle, falling back to [`WindowGeometry::DEFAULT`]
    pub fn restore_or_default(settings: &Settings) -> Self {
        match Self::restore(settings) {
            Ok(geometry) => {
                tracing::debug!("Restored window geometry {:?}", geometry);
                geometry
            }
            Err(e) => {
                tracing::debug!("Using default window geometry: {}", e);
                Self::DEFAULT
            }
        }
    }

    /// Store the rectangle unless the window is maximized.
    ///
    /// Returns whether anything was written.
    pub fn persist(&self, settings: &Settings, maximized: bool) -> anyhow::Result<bool> {
        if maximized {
            tracing::debug!("Window is maximized, keeping previous geometry");
            return Ok(false);
        }

        settings.update(|values| {
            values.insert(KEY_X.to_string(), self.x.to_string());
            values.insert(KEY_Y.to_string(), self.y.to_string());
            values.insert(KEY_WIDTH.to_string(), self.width.to_string());
            values.insert(KEY_HEIGHT.to_string(), self.height.to_string());
        });
        settings.flush()?;

        tracing::debug!("Saved window geometry {:?}", self);
        Ok(true)
    }
}

fn read_key<T: std::str::FromStr>(settings: &Settings, key: &'static str) -> Result<T, GeometryError> {
    let value = settings.get(key).ok_or(GeometryError::Missing(key))?;
    value.trim().parse().map_err(|_| GeometryError::Invalid { key, value })
}
