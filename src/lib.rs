//! # hue_bridge_rs
//!
//! An async Rust client for Philips Hue bridges on the local network.
//!
//! The crate covers the part of the bridge API that needs care: finding the
//! bridge, pairing with it through the physical link button, and sending
//! requests no faster than the bridge can take them.
//!
//! ## Quick Start
//!
//! ```ignore
//! use hue_bridge_rs::{Bridge, BridgeConfig};
//!
//! async fn lights_on(id: &str, username: Option<String>) -> Result<(), hue_bridge_rs::Error> {
//!     let bridge = Bridge::new(id, username, BridgeConfig::default())?;
//!     bridge
//!         .register_with(|| println!("Press the link button on the bridge"), &Default::default())
//!         .await?;
//!
//!     for light in bridge.get_lights().await? {
//!         let mut light = light?;
//!         light.set_transition_time(Some(10));
//!         light.set_on(true).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Discovery**: Map bridge ids to local addresses with [`discover_bridges`]
//! - **Pairing**: Obtain a username with [`Bridge::register`]; the wait for the link button can be cancelled
//! - **Rate Limiting**: Every request passes a [`RateLimiter`] (10 per second, 150 ms apart by default)
//! - **Lights**: Percent and degree setters on [`Light`], sent immediately or batched with [`Light::flush`]
//! - **Errors**: Bridge error envelopes surface as [`Error::Device`] with the typed [`ApiErrorKind`]
//!
//! ## Communication
//!
//! The bridge speaks JSON over https with a self-signed certificate, so
//! certificate validation is disabled for bridge requests. The discovery
//! service is contacted with validation enabled.
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade and never
//! installs a logger itself.

mod bridge;
mod config;
mod discovery;
mod errors;
mod light;
mod pairing;
mod payload;
mod rate_limit;
pub mod response;
mod status;
pub mod transport;
mod types;

// Re-export public API
pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use discovery::{
    DISCOVERY_URL, DiscoveredBridge, discover_bridges, discover_bridges_with, list_bridges,
    list_bridges_with,
};
pub use errors::{ApiError, ApiErrorKind, Error};
pub use light::Light;
pub use pairing::PairingState;
pub use payload::StatePayload;
pub use rate_limit::{RateLimit, RateLimiter};
pub use transport::{HttpTransport, Method, Transport, TransportConfig};
pub use types::{Hue, Level};
pub use tokio_util::sync::CancellationToken;
