//! Hue angle.

use serde::{Deserialize, Serialize};

/// A position on the color wheel.
///
/// Callers use degrees; the bridge uses 0-65535 for one full turn. Any angle
/// is accepted and wrapped into `[0, 360)` first, so -90° is 270° and 360°
/// is 0°.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hue {
    pub(crate) value: u16,
}

impl Hue {
    pub const MAX: u16 = u16::MAX;

    pub fn create(value: u16) -> Self {
        Hue { value }
    }

    /// Convert from degrees.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_bridge_rs::Hue;
    ///
    /// assert_eq!(Hue::from_degrees(0.0), Hue::from_degrees(360.0));
    /// assert_eq!(Hue::from_degrees(-90.0), Hue::from_degrees(270.0));
    /// assert_eq!(Hue::from_degrees(180.0).native(), 32767);
    /// ```
    pub fn from_degrees(degrees: f64) -> Self {
        let wrapped = degrees.rem_euclid(360.0);
        let native = (Self::MAX as f64 * (wrapped / 360.0)).clamp(0.0, Self::MAX as f64);
        Hue {
            value: native as u16,
        }
    }

    pub fn native(&self) -> u16 {
        self.value
    }

    pub fn degrees(&self) -> f64 {
        self.value as f64 / Self::MAX as f64 * 360.0
    }
}
