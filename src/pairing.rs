//! Link-button pairing.
//!
//! Pairing posts the application's device type to the root API until the
//! bridge hands out a username. Until somebody presses the physical link
//! button the bridge answers with error 101, which is the one device error
//! that is expected and polled through.

use log::info;
use serde_json::Value;

use crate::errors::{ApiErrorKind, Error};
use crate::response;

type Result<T> = std::result::Result<T, Error>;

/// Where a pairing attempt stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingState {
    Unregistered,
    AwaitingButtonPress,
    /// Terminal; carries the issued username.
    Registered(String),
}

impl PairingState {
    pub fn is_registered(&self) -> bool {
        matches!(self, PairingState::Registered(_))
    }
}

/// Drives [`PairingState`] from successive bridge responses.
///
/// `notify` runs once, on the first response asking for the link button.
pub(crate) struct Pairing<F> {
    state: PairingState,
    notify: Option<F>,
}

impl<F: FnOnce()> Pairing<F> {
    pub fn new(notify: F) -> Self {
        Pairing {
            state: PairingState::Unregistered,
            notify: Some(notify),
        }
    }

    pub fn state(&self) -> &PairingState {
        &self.state
    }

    /// Feed one response to `POST /api` and advance.
    ///
    /// Anything other than a single-element array holding either error 101 or
    /// a success with a username is a protocol error.
    pub fn observe(&mut self, parsed: &Value) -> Result<&PairingState> {
        let entry = match parsed.as_array().map(Vec::as_slice) {
            Some([entry]) => entry,
            _ => return Err(Error::protocol(format!("pairing response {}", parsed))),
        };

        if let Some(error) = response::detect_error(parsed, true) {
            if error.kind() != Some(ApiErrorKind::LinkButtonNotPressed) {
                return Err(Error::protocol(format!("pairing response {}", parsed)));
            }
            if let Some(notify) = self.notify.take() {
                info!("waiting for the link button to be pressed");
                notify();
            }
            self.state = PairingState::AwaitingButtonPress;
            return Ok(&self.state);
        }

        match entry.pointer("/success/username").and_then(Value::as_str) {
            Some(username) => {
                info!("bridge issued a username");
                self.state = PairingState::Registered(username.to_string());
                Ok(&self.state)
            }
            None => Err(Error::protocol(format!("pairing response {}", parsed))),
        }
    }
}
