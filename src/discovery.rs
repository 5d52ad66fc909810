//! Bridge discovery through the public discovery service.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::errors::Error;
use crate::transport::{HttpTransport, Method, Transport, TransportConfig};

type Result<T> = std::result::Result<T, Error>;

/// Public endpoint listing the bridges registered from the caller's network.
pub const DISCOVERY_URL: &str = "https://discovery.meethue.com/";

/// A bridge listed by the discovery service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredBridge {
    /// Bridge identifier
    pub id: String,
    /// Address of the bridge on the local network
    #[serde(rename = "internalipaddress")]
    pub ip: String,
}

impl DiscoveredBridge {
    /// Convert this entry into an unregistered [`Bridge`] with a known address.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// for found in list_bridges().await? {
    ///     let bridge = found.into_bridge(BridgeConfig::default())?;
    ///     bridge.register().await?;
    /// }
    /// ```
    pub fn into_bridge(self, config: BridgeConfig) -> Result<Bridge> {
        Ok(Bridge::new(self.id, None, config)?.with_address(self.ip))
    }
}

/// Query the discovery service and map each bridge id to its local address.
///
/// Zero bridges is an empty map, not an error. Duplicate ids keep the last
/// entry. Nothing is cached; every call goes out to the service.
///
/// # Examples
///
/// ```ignore
/// let bridges = hue_bridge_rs::discover_bridges().await?;
/// for (id, ip) in &bridges {
///     println!("{id} at {ip}");
/// }
/// ```
pub async fn discover_bridges() -> Result<HashMap<String, String>> {
    let transport = HttpTransport::new(&TransportConfig::public(Duration::from_secs(10)))?;
    let url = Url::parse(DISCOVERY_URL)?;
    discover_bridges_with(&transport, &url).await
}

/// Like [`discover_bridges`], but keeping every entry in response order.
pub async fn list_bridges() -> Result<Vec<DiscoveredBridge>> {
    let transport = HttpTransport::new(&TransportConfig::public(Duration::from_secs(10)))?;
    let url = Url::parse(DISCOVERY_URL)?;
    list_bridges_with(&transport, &url).await
}

/// [`discover_bridges`] against an explicit transport and endpoint.
pub async fn discover_bridges_with<T: Transport>(
    transport: &T,
    url: &Url,
) -> Result<HashMap<String, String>> {
    let bridges = list_bridges_with(transport, url).await?;
    Ok(bridges
        .into_iter()
        .map(|bridge| (bridge.id, bridge.ip))
        .collect())
}

/// [`list_bridges`] against an explicit transport and endpoint.
pub async fn list_bridges_with<T: Transport>(
    transport: &T,
    url: &Url,
) -> Result<Vec<DiscoveredBridge>> {
    let raw = transport.send(Method::Get, url, None).await?;
    let bridges: Vec<DiscoveredBridge> = serde_json::from_str(&raw).map_err(Error::Parse)?;
    debug!("discovery returned {} bridge(s)", bridges.len());
    Ok(bridges)
}
