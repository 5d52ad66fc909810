//! Light descriptions as reported by the bridge.

use serde::{Deserialize, Serialize};

/// One entry of `GET /api/<username>/lights`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct LightRecord {
    pub name: String,
    pub state: StateRecord,
    #[serde(rename = "type", default)]
    pub light_type: Option<String>,
    #[serde(rename = "modelid", default)]
    pub model_id: Option<String>,
}

/// The `state` object of a light.
///
/// White-only lights omit the color fields, which then read as zero.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct StateRecord {
    pub on: bool,
    #[serde(default)]
    pub bri: u64,
    #[serde(default)]
    pub hue: u64,
    #[serde(default)]
    pub sat: u64,
    #[serde(default = "no_effect")]
    pub effect: String,
    #[serde(default = "reachable")]
    pub reachable: bool,
}

fn no_effect() -> String {
    "none".to_string()
}

fn reachable() -> bool {
    true
}
