//! Brightness and saturation levels.

use serde::{Deserialize, Serialize};

/// A brightness or saturation level.
///
/// The bridge stores both as an integer from 0 to 254; callers work in
/// percent. Conversions truncate, so a native value read back through
/// [`Level::percent`] and [`Level::from_percent`] lands within one step of
/// where it started.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level {
    pub(crate) value: u8,
}

impl Level {
    pub const MAX: u8 = 254;

    /// Returns None if value is above the native maximum (254).
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_bridge_rs::Level;
    ///
    /// assert!(Level::create(254).is_some());
    /// assert!(Level::create(255).is_none());
    /// ```
    pub fn create(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Level { value })
    }

    /// Clamps any native value into range.
    pub fn saturating(value: u64) -> Self {
        Level {
            value: value.min(Self::MAX as u64) as u8,
        }
    }

    /// Convert from percent, clamping to 0-100.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_bridge_rs::Level;
    ///
    /// assert_eq!(Level::from_percent(100.0).native(), 254);
    /// assert_eq!(Level::from_percent(50.0).native(), 127);
    /// assert_eq!(Level::from_percent(150.0).native(), 254);
    /// assert_eq!(Level::from_percent(-5.0).native(), 0);
    /// ```
    pub fn from_percent(percent: f64) -> Self {
        let native = (Self::MAX as f64 * percent / 100.0).clamp(0.0, Self::MAX as f64);
        Level {
            value: native as u8,
        }
    }

    pub fn native(&self) -> u8 {
        self.value
    }

    pub fn percent(&self) -> f64 {
        (self.value as f64 * 100.0 / Self::MAX as f64).min(100.0)
    }
}
