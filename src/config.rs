//! Bridge client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

use crate::discovery::DISCOVERY_URL;
use crate::rate_limit::RateLimit;

/// Settings for one [`crate::Bridge`].
///
/// Every field has a default, so a partial document deserializes cleanly.
/// Durations are written in milliseconds.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use hue_bridge_rs::BridgeConfig;
///
/// let config: BridgeConfig =
///     serde_json::from_str(r#"{"application_name": "ambilight", "pairing_interval": 250}"#).unwrap();
/// assert_eq!(config.device_type(), "hue_bridge_rs#ambilight");
/// assert_eq!(config.pairing_interval, Duration::from_millis(250));
/// assert!(config.use_tls);
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Shown in the bridge's whitelist as part of the device type.
    pub application_name: String,
    pub discovery_url: String,
    /// Talk to the bridge over https. Only emulators and tests turn this off.
    pub use_tls: bool,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub request_timeout: Duration,
    /// Delay between pairing attempts while waiting for the link button.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub pairing_interval: Duration,
    pub rate_limit: RateLimit,
}

impl BridgeConfig {
    const DEVICE_TYPE_PREFIX: &'static str = "hue_bridge_rs";

    /// The `devicetype` sent when pairing.
    pub fn device_type(&self) -> String {
        format!("{}#{}", Self::DEVICE_TYPE_PREFIX, self.application_name)
    }

    pub(crate) fn scheme(&self) -> &'static str {
        if self.use_tls { "https" } else { "http" }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            application_name: "unknown".to_string(),
            discovery_url: DISCOVERY_URL.to_string(),
            use_tls: true,
            request_timeout: Duration::from_secs(10),
            pairing_interval: Duration::from_millis(500),
            rate_limit: RateLimit::default(),
        }
    }
}
