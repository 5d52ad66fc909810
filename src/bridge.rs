//! The bridge client.

use std::sync::OnceLock;

use futures::future::{self, Either};
use log::{debug, info};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::BridgeConfig;
use crate::discovery;
use crate::errors::Error;
use crate::light::Light;
use crate::pairing::{Pairing, PairingState};
use crate::rate_limit::RateLimiter;
use crate::response;
use crate::transport::{HttpTransport, Method, Transport, TransportConfig};

type Result<T> = std::result::Result<T, Error>;

/// A connection to one Hue bridge.
///
/// Every request to the bridge goes through [`Bridge::send_api_request`],
/// which throttles it with the bridge's [`RateLimiter`]. The bridge address is
/// looked up through discovery the first time it is needed and kept after
/// that; call [`Bridge::force_rediscover`] if the bridge moved.
///
/// A `Bridge` is `Sync`, so it can be shared between tasks behind an `Arc`.
///
/// # Example
///
/// ```ignore
/// use hue_bridge_rs::{Bridge, BridgeConfig};
///
/// let bridge = Bridge::new("001788fffe100491", None, BridgeConfig::default())?;
/// bridge
///     .register_with(|| println!("press the link button"), &Default::default())
///     .await?;
/// for light in bridge.get_lights().await? {
///     let mut light = light?;
///     light.set_on(true).await?;
/// }
/// ```
pub struct Bridge<T: Transport = HttpTransport> {
    id: String,
    config: BridgeConfig,
    address: Mutex<Option<String>>,
    username: OnceLock<String>,
    limiter: RateLimiter,
    transport: T,
    discovery: T,
}

impl Bridge<HttpTransport> {
    /// Create a client for the bridge with the given id.
    ///
    /// Pass the username from an earlier pairing to skip [`Bridge::register`].
    pub fn new(id: impl Into<String>, username: Option<String>, config: BridgeConfig) -> Result<Self> {
        let transport = HttpTransport::new(&TransportConfig::device(config.request_timeout))?;
        let discovery = HttpTransport::new(&TransportConfig::public(config.request_timeout))?;
        Ok(Self::with_transport(id, username, config, transport, discovery))
    }
}

impl<T: Transport> Bridge<T> {
    /// Create a client over custom transports; `discovery` is only used to
    /// look up the bridge address.
    pub fn with_transport(
        id: impl Into<String>,
        username: Option<String>,
        config: BridgeConfig,
        transport: T,
        discovery: T,
    ) -> Self {
        let credential = OnceLock::new();
        if let Some(username) = username {
            let _ = credential.set(username);
        }
        Bridge {
            id: id.into(),
            limiter: RateLimiter::new(config.rate_limit),
            config,
            address: Mutex::new(None),
            username: credential,
            transport,
            discovery,
        }
    }

    /// Use a known address instead of asking the discovery service.
    pub fn with_address(self, ip: impl Into<String>) -> Self {
        Bridge {
            address: Mutex::new(Some(ip.into())),
            ..self
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn username(&self) -> Option<&str> {
        self.username.get().map(String::as_str)
    }

    pub fn is_registered(&self) -> bool {
        self.username.get().is_some()
    }

    pub fn pairing_state(&self) -> PairingState {
        match self.username.get() {
            Some(username) => PairingState::Registered(username.clone()),
            None => PairingState::Unregistered,
        }
    }

    /// The bridge's local address, running discovery on first use.
    pub async fn ip_address(&self) -> Result<String> {
        let mut address = self.address.lock().await;
        if let Some(ip) = address.as_ref() {
            return Ok(ip.clone());
        }
        let ip = self.discover().await?;
        *address = Some(ip.clone());
        Ok(ip)
    }

    /// Discard the cached address and look the bridge up again.
    pub async fn force_rediscover(&self) -> Result<String> {
        let mut address = self.address.lock().await;
        *address = None;
        let ip = self.discover().await?;
        *address = Some(ip.clone());
        Ok(ip)
    }

    async fn discover(&self) -> Result<String> {
        let url = Url::parse(&self.config.discovery_url)?;
        let bridges = discovery::discover_bridges_with(&self.discovery, &url).await?;
        let ip = bridges.get(&self.id).cloned().ok_or_else(|| Error::NotFound {
            id: self.id.clone(),
        })?;
        info!("bridge {} resolved to {}", self.id, ip);
        Ok(ip)
    }

    /// Pair with the bridge unless a username is already known.
    ///
    /// Polls until the link button is pressed, without a timeout.
    pub async fn register(&self) -> Result<&str> {
        self.register_with(|| {}, &CancellationToken::new()).await
    }

    /// Pair with the bridge, calling `on_button` once when the bridge asks for
    /// the link button.
    ///
    /// Returns [`Error::Cancelled`] if `cancel` fires before pairing completes.
    pub async fn register_with<F: FnOnce()>(
        &self,
        on_button: F,
        cancel: &CancellationToken,
    ) -> Result<&str> {
        if let Some(username) = self.username.get() {
            return Ok(username.as_str());
        }

        let identity = json!({ "devicetype": self.config.device_type() });
        let mut pairing = Pairing::new(on_button);

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let parsed = self
                .send_api_request(Method::Post, "", Some(&identity), false)
                .await?;

            if let PairingState::Registered(username) = pairing.observe(&parsed)? {
                let username = username.clone();
                return Ok(self.username.get_or_init(|| username).as_str());
            }

            debug!(
                "pairing {:?}, retrying in {:?}",
                pairing.state(),
                self.config.pairing_interval
            );
            let wait = sleep(self.config.pairing_interval);
            let cancelled = cancel.cancelled();
            futures::pin_mut!(wait);
            futures::pin_mut!(cancelled);
            if let Either::Right(_) = future::select(wait, cancelled).await {
                return Err(Error::Cancelled);
            }
        }
    }

    /// Fetch every light known to the bridge.
    ///
    /// The listing is fetched once; the iterator builds one [`Light`] per
    /// entry as it is advanced, in the order the bridge listed them. Call
    /// again to re-fetch.
    pub async fn get_lights(
        &self,
    ) -> Result<impl Iterator<Item = Result<Light<'_, T>>> + '_> {
        let path = format!("/{}/lights", self.require_username()?);
        let listing = self.send_api_request(Method::Get, &path, None, true).await?;
        let entries = match listing {
            Value::Object(entries) => entries,
            other => return Err(Error::protocol(format!("light listing {}", other))),
        };
        Ok(entries
            .into_iter()
            .map(move |(number, record)| Light::hydrate(self, &number, record)))
    }

    /// Fetch a single light by number.
    pub async fn get_light(&self, number: u32) -> Result<Light<'_, T>> {
        let path = format!("/{}/lights/{}", self.require_username()?, number);
        let record = self.send_api_request(Method::Get, &path, None, true).await?;
        Light::hydrate(self, &number.to_string(), record)
    }

    /// Send one request to the bridge API.
    ///
    /// `path` is relative to `/api` (an empty path is the API root). With
    /// `detect_error` set, a response whose first element is an error fails
    /// with [`Error::Device`]; otherwise the parsed body is returned as is.
    pub async fn send_api_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        detect_error: bool,
    ) -> Result<Value> {
        let url = self.api_url(path).await?;

        let raw = self
            .limiter
            .admit(|| self.transport.send(method, &url, body))
            .await?;
        let parsed = response::parse(&raw)?;

        if let Some(error) = response::detect_error(&parsed, detect_error) {
            debug!("{} {} rejected: {}", method, path, error);
            return Err(Error::Device {
                method,
                path: path.to_string(),
                error,
            });
        }
        Ok(parsed)
    }

    pub(crate) fn require_username(&self) -> Result<&str> {
        self.username().ok_or(Error::NotRegistered)
    }

    #[cfg(test)]
    pub(crate) fn transport_for_tests(&self) -> &T {
        &self.transport
    }

    async fn api_url(&self, path: &str) -> Result<Url> {
        let ip = self.ip_address().await?;
        Ok(Url::parse(&format!("{}://{}/api{}", self.config.scheme(), ip, path))?)
    }
}
