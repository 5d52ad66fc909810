//! Individual light control.

use log::{debug, warn};
use serde_json::{Value, json};

use crate::bridge::Bridge;
use crate::errors::Error;
use crate::payload::StatePayload;
use crate::response::{self, Classification};
use crate::status::LightRecord;
use crate::transport::{HttpTransport, Method, Transport};
use crate::types::{Hue, Level};

type Result<T> = std::result::Result<T, Error>;

/// One light attached to a [`Bridge`].
///
/// Setters take human units (percent, degrees) and store the bridge's native
/// values. With `auto_update_state` on (the default) every setter sends its
/// attribute to the bridge right away, one request per attribute. With it
/// off, setters only change the local copy and [`Light::flush`] sends
/// everything in one request.
///
/// A transition time, when set, rides along with the next state update only.
pub struct Light<'a, T: Transport = HttpTransport> {
    bridge: &'a Bridge<T>,
    number: u32,
    name: String,
    on: bool,
    effect: String,
    brightness: Level,
    saturation: Level,
    hue: Hue,
    reachable: bool,
    light_type: Option<String>,
    model_id: Option<String>,
    transition_time: Option<u16>,
    auto_update_state: bool,
}

impl<'a, T: Transport> Light<'a, T> {
    /// Build a light from one entry of the bridge's light listing.
    pub(crate) fn hydrate(bridge: &'a Bridge<T>, number: &str, record: Value) -> Result<Self> {
        let number = number
            .parse()
            .map_err(|_| Error::protocol(format!("light number {:?}", number)))?;
        let mut light = Light {
            bridge,
            number,
            name: String::new(),
            on: false,
            effect: String::new(),
            brightness: Level::default(),
            saturation: Level::default(),
            hue: Hue::default(),
            reachable: true,
            light_type: None,
            model_id: None,
            transition_time: None,
            auto_update_state: true,
        };
        light.apply(record)?;
        Ok(light)
    }

    fn apply(&mut self, record: Value) -> Result<()> {
        let record: LightRecord = serde_json::from_value(record)
            .map_err(|e| Error::protocol(format!("light {}: {}", self.number, e)))?;
        let state = record.state;

        self.name = record.name;
        self.on = state.on;
        self.effect = state.effect;
        self.brightness = Level::saturating(state.bri);
        self.saturation = Level::saturating(state.sat);
        self.hue = Hue::create(state.hue.min(Hue::MAX as u64) as u16);
        self.reachable = state.reachable;
        self.light_type = record.light_type;
        self.model_id = record.model_id;
        Ok(())
    }

    pub fn bridge(&self) -> &'a Bridge<T> {
        self.bridge
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn effect(&self) -> &str {
        &self.effect
    }

    /// Brightness in percent.
    pub fn brightness(&self) -> f64 {
        self.brightness.percent()
    }

    /// Saturation in percent.
    pub fn saturation(&self) -> f64 {
        self.saturation.percent()
    }

    pub fn hue(&self) -> Hue {
        self.hue
    }

    /// Whether the bridge could reach the light at the last refresh.
    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    /// The bridge's description of the light, e.g. "Extended color light".
    pub fn light_type(&self) -> Option<&str> {
        self.light_type.as_deref()
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    pub fn auto_update_state(&self) -> bool {
        self.auto_update_state
    }

    pub fn set_auto_update_state(&mut self, auto_update_state: bool) {
        self.auto_update_state = auto_update_state;
    }

    pub fn transition_time(&self) -> Option<u16> {
        self.transition_time
    }

    /// Set the transition, in tenths of a second, for the next state update.
    pub fn set_transition_time(&mut self, tenths: Option<u16>) {
        self.transition_time = tenths;
    }

    pub async fn set_on(&mut self, on: bool) -> Result<()> {
        self.on = on;
        self.stage(StatePayload::new().on(on).clone()).await
    }

    pub async fn set_effect(&mut self, effect: &str) -> Result<()> {
        self.effect = effect.to_string();
        self.stage(StatePayload::new().effect(effect).clone()).await
    }

    /// Set brightness in percent (clamped to 0-100).
    pub async fn set_brightness(&mut self, percent: f64) -> Result<()> {
        self.brightness = Level::from_percent(percent);
        self.stage(StatePayload::new().brightness(self.brightness).clone())
            .await
    }

    /// Set saturation in percent (clamped to 0-100).
    pub async fn set_saturation(&mut self, percent: f64) -> Result<()> {
        self.saturation = Level::from_percent(percent);
        self.stage(StatePayload::new().saturation(self.saturation).clone())
            .await
    }

    /// Set hue in degrees; any angle is wrapped into a single turn.
    pub async fn set_hue(&mut self, degrees: f64) -> Result<()> {
        self.hue = Hue::from_degrees(degrees);
        self.stage(StatePayload::new().hue(self.hue).clone()).await
    }

    /// Rename the light. Always sent immediately.
    pub async fn set_name(&mut self, name: &str) -> Result<()> {
        self.name = name.to_string();
        let path = format!(
            "/{}/lights/{}",
            self.bridge.require_username()?,
            self.number
        );
        self.bridge
            .send_api_request(Method::Put, &path, Some(&json!({ "name": name })), true)
            .await?;
        Ok(())
    }

    /// Send every state attribute in one request.
    ///
    /// Only valid while `auto_update_state` is off.
    pub async fn flush(&mut self) -> Result<()> {
        if self.auto_update_state {
            return Err(Error::AutoUpdateEnabled);
        }
        let mut payload = StatePayload::new();
        payload
            .on(self.on)
            .effect(&self.effect)
            .hue(self.hue)
            .saturation(self.saturation)
            .brightness(self.brightness);
        self.update_state(payload).await
    }

    /// Send several attributes in one request, whatever `auto_update_state`
    /// says, and mirror them locally.
    ///
    /// Fails with [`Error::NoAttribute`] if the payload sets no light attribute.
    pub async fn set(&mut self, payload: &StatePayload) -> Result<()> {
        self.update_state(payload.clone()).await?;
        if let Some(on) = payload.on {
            self.on = on;
        }
        if let Some(effect) = &payload.effect {
            self.effect = effect.clone();
        }
        if let Some(hue) = payload.hue {
            self.hue = Hue::create(hue);
        }
        if let Some(sat) = payload.saturation {
            self.saturation = Level::saturating(sat.into());
        }
        if let Some(bri) = payload.brightness {
            self.brightness = Level::saturating(bri.into());
        }
        Ok(())
    }

    /// Reload this light's attributes from the bridge.
    pub async fn refresh(&mut self) -> Result<()> {
        let path = format!(
            "/{}/lights/{}",
            self.bridge.require_username()?,
            self.number
        );
        let record = self
            .bridge
            .send_api_request(Method::Get, &path, None, true)
            .await?;
        self.apply(record)
    }

    async fn stage(&mut self, payload: StatePayload) -> Result<()> {
        if !self.auto_update_state {
            return Ok(());
        }
        self.update_state(payload).await
    }

    async fn update_state(&mut self, mut payload: StatePayload) -> Result<()> {
        if !payload.is_valid() {
            return Err(Error::NoAttribute);
        }
        let path = format!(
            "/{}/lights/{}/state",
            self.bridge.require_username()?,
            self.number
        );
        if let (Some(tenths), None) = (self.transition_time, payload.transition_time) {
            payload.transition_time(tenths);
        }
        let body = serde_json::to_value(&payload).map_err(Error::JsonDump)?;
        debug!("light {} state update {}", self.number, body);
        let results = self
            .bridge
            .send_api_request(Method::Put, &path, Some(&body), true)
            .await?;
        self.transition_time = None;

        if let Classification::PartialSuccess { errors, .. } = response::classify(&results) {
            for error in errors {
                warn!("light {} rejected part of a state update: {}", self.number, error);
            }
        }
        Ok(())
    }
}

impl<T: Transport> std::fmt::Debug for Light<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Light")
            .field("bridge", &self.bridge.id())
            .field("number", &self.number)
            .field("name", &self.name)
            .field("on", &self.on)
            .field("effect", &self.effect)
            .field("brightness", &self.brightness)
            .field("saturation", &self.saturation)
            .field("hue", &self.hue)
            .field("auto_update_state", &self.auto_update_state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::transport::testing::ScriptedTransport;

    fn bridge(username: Option<&str>) -> Bridge<ScriptedTransport> {
        Bridge::with_transport(
            "001788fffe100491",
            username.map(String::from),
            BridgeConfig::default(),
            ScriptedTransport::new(),
            ScriptedTransport::new(),
        )
        .with_address("192.168.1.2")
    }

    fn record() -> Value {
        json!({
            "name": "Desk",
            "state": {"on": true, "bri": 100, "hue": 46920, "sat": 200, "effect": "none", "reachable": true}
        })
    }

    fn ok() -> Value {
        json!([{"success": {}}])
    }

    fn bodies(bridge: &Bridge<ScriptedTransport>) -> Vec<Value> {
        bridge
            .transport_for_tests()
            .requests()
            .into_iter()
            .filter_map(|r| r.body)
            .collect()
    }

    #[test]
    fn test_hydrate_reads_hue_field() {
        let bridge = bridge(Some("user"));
        let light = Light::hydrate(&bridge, "3", record()).unwrap();
        assert_eq!(light.number(), 3);
        assert_eq!(light.name(), "Desk");
        assert!(light.is_on());
        assert_eq!(light.hue().native(), 46920);
        assert_eq!(light.brightness(), 100.0 * 100.0 / 254.0);
        assert!(light.auto_update_state());
    }

    #[test]
    fn test_hydrate_rejects_bad_number() {
        let bridge = bridge(Some("user"));
        let err = Light::hydrate(&bridge, "abc", record()).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_update_sends_one_attribute() {
        let bridge = bridge(Some("user"));
        for _ in 0..5 {
            bridge.transport_for_tests().push(ok());
        }
        let mut light = Light::hydrate(&bridge, "1", record()).unwrap();

        light.set_on(false).await.unwrap();
        light.set_brightness(50.0).await.unwrap();
        light.set_saturation(100.0).await.unwrap();
        light.set_hue(-90.0).await.unwrap();
        light.set_effect("colorloop").await.unwrap();

        assert_eq!(
            bodies(&bridge),
            vec![
                json!({"on": false}),
                json!({"bri": 127}),
                json!({"sat": 254}),
                json!({"hue": Hue::from_degrees(270.0).native()}),
                json!({"effect": "colorloop"}),
            ]
        );
        let requests = bridge.transport_for_tests().requests();
        assert!(requests
            .iter()
            .all(|r| r.method == Method::Put && r.url == "https://192.168.1.2/api/user/lights/1/state"));
    }

    #[tokio::test]
    async fn test_staged_updates_flush_once() {
        let bridge = bridge(Some("user"));
        bridge.transport_for_tests().push(ok());
        let mut light = Light::hydrate(&bridge, "1", record()).unwrap();
        light.set_auto_update_state(false);

        light.set_on(true).await.unwrap();
        light.set_brightness(100.0).await.unwrap();
        light.set_hue(360.0).await.unwrap();
        assert!(bridge.transport_for_tests().requests().is_empty());

        light.flush().await.unwrap();
        assert_eq!(
            bodies(&bridge),
            vec![json!({"on": true, "effect": "none", "hue": 0, "sat": 200, "bri": 254})]
        );
    }

    #[tokio::test]
    async fn test_flush_requires_manual_mode() {
        let bridge = bridge(Some("user"));
        let mut light = Light::hydrate(&bridge, "1", record()).unwrap();
        assert_eq!(light.flush().await.unwrap_err(), Error::AutoUpdateEnabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_time_applies_once() {
        let bridge = bridge(Some("user"));
        bridge.transport_for_tests().push(ok());
        bridge.transport_for_tests().push(ok());
        let mut light = Light::hydrate(&bridge, "1", record()).unwrap();

        light.set_transition_time(Some(4));
        light.set_on(true).await.unwrap();
        light.set_on(false).await.unwrap();

        assert_eq!(
            bodies(&bridge),
            vec![json!({"on": true, "transitiontime": 4}), json!({"on": false})]
        );
        assert_eq!(light.transition_time(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_time_survives_failed_send() {
        let bridge = bridge(Some("user"));
        let mut light = Light::hydrate(&bridge, "1", record()).unwrap();
        light.set_transition_time(Some(4));

        let err = light.set_on(true).await.unwrap_err();
        assert!(matches!(err, Error::Network { .. }));
        assert_eq!(light.transition_time(), Some(4));

        bridge.transport_for_tests().push(ok());
        light.set_on(true).await.unwrap();
        assert_eq!(light.transition_time(), None);
        assert_eq!(
            bodies(&bridge),
            vec![
                json!({"on": true, "transitiontime": 4}),
                json!({"on": true, "transitiontime": 4})
            ]
        );
    }

    #[tokio::test]
    async fn test_transition_time_kept_when_unregistered() {
        let bridge = bridge(None);
        let mut light = Light::hydrate(&bridge, "1", record()).unwrap();
        light.set_transition_time(Some(4));
        assert_eq!(light.set_on(true).await.unwrap_err(), Error::NotRegistered);
        assert_eq!(light.transition_time(), Some(4));
    }

    #[tokio::test]
    async fn test_set_payload() {
        let bridge = bridge(Some("user"));
        bridge.transport_for_tests().push(ok());
        let mut light = Light::hydrate(&bridge, "1", record()).unwrap();

        let mut payload = StatePayload::new();
        payload.transition_time(10);
        assert_eq!(light.set(&payload).await.unwrap_err(), Error::NoAttribute);
        assert!(bridge.transport_for_tests().requests().is_empty());

        payload.on(false).brightness(Level::from_percent(100.0));
        light.set(&payload).await.unwrap();
        assert!(!light.is_on());
        assert_eq!(light.brightness(), 100.0);
        assert_eq!(
            bodies(&bridge),
            vec![json!({"on": false, "bri": 254, "transitiontime": 10})]
        );
    }

    #[tokio::test]
    async fn test_partial_success_is_not_an_error() {
        let bridge = bridge(Some("user"));
        bridge.transport_for_tests().push(json!([
            {"success": {"/lights/1/state/on": true}},
            {"error": {"type": 201, "address": "/lights/1/state/hue", "description": "parameter, hue, is not modifiable. Device is set to off."}}
        ]));
        let mut light = Light::hydrate(&bridge, "1", record()).unwrap();

        let mut payload = StatePayload::new();
        payload.on(true).hue(Hue::from_degrees(90.0));
        light.set(&payload).await.unwrap();
        assert!(light.is_on());
    }

    #[tokio::test]
    async fn test_device_error_surfaces() {
        let bridge = bridge(Some("user"));
        bridge.transport_for_tests().push(json!([
            {"error": {"type": 201, "address": "/lights/1/state/hue", "description": "parameter, hue, is not modifiable. Device is set to off."}}
        ]));
        let mut light = Light::hydrate(&bridge, "1", record()).unwrap();
        let err = light.set_hue(10.0).await.unwrap_err();
        assert_eq!(err.api_error().map(|e| e.error_type), Some(201));
    }

    #[tokio::test]
    async fn test_rename_ignores_auto_update() {
        let bridge = bridge(Some("user"));
        bridge.transport_for_tests().push(ok());
        let mut light = Light::hydrate(&bridge, "7", record()).unwrap();
        light.set_auto_update_state(false);

        light.set_name("Reading").await.unwrap();
        assert_eq!(light.name(), "Reading");
        let requests = bridge.transport_for_tests().requests();
        assert_eq!(requests[0].url, "https://192.168.1.2/api/user/lights/7");
        assert_eq!(requests[0].body, Some(json!({"name": "Reading"})));
    }

    #[tokio::test]
    async fn test_refresh() {
        let bridge = bridge(Some("user"));
        bridge.transport_for_tests().push(json!({
            "name": "Desk",
            "state": {"on": false, "bri": 254, "hue": 0, "sat": 0, "effect": "colorloop", "reachable": false}
        }));
        let mut light = Light::hydrate(&bridge, "1", record()).unwrap();
        light.refresh().await.unwrap();
        assert!(!light.is_on());
        assert_eq!(light.brightness(), 100.0);
        assert_eq!(light.effect(), "colorloop");
        assert!(!light.is_reachable());
    }

    #[tokio::test]
    async fn test_unregistered_bridge() {
        let bridge = bridge(None);
        let mut light = Light::hydrate(&bridge, "1", record()).unwrap();
        assert_eq!(light.set_on(true).await.unwrap_err(), Error::NotRegistered);
    }
}
