//! Body of a light state update.

use serde::{Deserialize, Serialize};

use crate::types::{Hue, Level};

/// Attributes to change in one `PUT .../lights/<n>/state` request.
///
/// Unset attributes are left out of the request body, so a payload holding a
/// single attribute changes only that attribute on the bridge.
///
/// ```
/// use hue_bridge_rs::{Level, StatePayload};
///
/// let mut payload = StatePayload::new();
/// assert!(!payload.is_valid());
///
/// payload.on(true).brightness(Level::from_percent(100.0));
/// assert_eq!(
///     serde_json::to_value(&payload).unwrap(),
///     serde_json::json!({"on": true, "bri": 254})
/// );
/// ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StatePayload {
    pub(crate) on: Option<bool>,
    pub(crate) effect: Option<String>,
    pub(crate) hue: Option<u16>,
    #[serde(rename = "sat")]
    pub(crate) saturation: Option<u8>,
    #[serde(rename = "bri")]
    pub(crate) brightness: Option<u8>,
    /// Tenths of a second.
    #[serde(rename = "transitiontime")]
    pub(crate) transition_time: Option<u16>,
}

impl StatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if at least one light attribute is set; a transition time alone
    /// changes nothing.
    pub fn is_valid(&self) -> bool {
        self.on.is_some()
            || self.effect.is_some()
            || self.hue.is_some()
            || self.saturation.is_some()
            || self.brightness.is_some()
    }

    pub fn on(&mut self, on: bool) -> &mut Self {
        self.on = Some(on);
        self
    }

    pub fn effect(&mut self, effect: &str) -> &mut Self {
        self.effect = Some(effect.to_string());
        self
    }

    pub fn hue(&mut self, hue: Hue) -> &mut Self {
        self.hue = Some(hue.native());
        self
    }

    pub fn saturation(&mut self, saturation: Level) -> &mut Self {
        self.saturation = Some(saturation.native());
        self
    }

    pub fn brightness(&mut self, brightness: Level) -> &mut Self {
        self.brightness = Some(brightness.native());
        self
    }

    pub fn transition_time(&mut self, tenths: u16) -> &mut Self {
        self.transition_time = Some(tenths);
        self
    }
}
