use std::fmt;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::transport::Method;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// All error types that can occur when talking to a Hue bridge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP exchange itself failed (connection refused, timeout, TLS).
    #[error("network {action} error: {source}")]
    Network {
        action: String,
        #[source]
        source: BoxError,
    },

    /// A response body was not valid JSON, or not the JSON shape expected.
    #[error("failed to load json: {0}")]
    Parse(serde_json::Error),

    /// Failed to serialize a request body.
    #[error("failed to dump json: {0}")]
    JsonDump(serde_json::Error),

    /// The bridge answered with its own error envelope.
    #[error("failed to {method} to '{path}': {error}")]
    Device {
        method: Method,
        path: String,
        error: ApiError,
    },

    /// The bridge answered with something outside the documented contract.
    #[error("unexpected response: {0}")]
    Protocol(String),

    /// The bridge id was not part of the discovery response.
    #[error("bridge {id} not found in discovery results")]
    NotFound { id: String },

    /// A resource call was made before pairing produced a username.
    #[error("bridge is not registered; pair it first")]
    NotRegistered,

    /// [`crate::Light::flush`] was called while every setter already sends its own update.
    #[error("state is auto-updating")]
    AutoUpdateEnabled,

    /// Attempted to send a [`crate::StatePayload`] with no light attribute set.
    #[error("invalid payload; no attributes set")]
    NoAttribute,

    /// Pairing was stopped through its cancellation token.
    #[error("pairing cancelled")]
    Cancelled,

    /// A request URL could not be built from the bridge address.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Create a new network error
    pub fn network<E>(action: &str, err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Network {
            action: action.to_string(),
            source: err.into(),
        }
    }

    /// Create a new protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol(message.into())
    }

    /// The device error carried by a [`Error::Device`], if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Device { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

/// An error envelope reported by the bridge.
///
/// The bridge wraps failures as `{"error": {"type": 101, "address": "", "description": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Zero when the bridge sent an envelope without a usable type.
    #[serde(rename = "type")]
    pub error_type: i64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl ApiError {
    /// The well-known error kind, or `None` for codes this crate does not name.
    pub fn kind(&self) -> Option<ApiErrorKind> {
        ApiErrorKind::create(self.error_type)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (type {})", self.description, self.error_type)
    }
}

/// Error codes documented for the bridge's v1 REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum ApiErrorKind {
    UnauthorizedUser = 1,
    InvalidJson = 2,
    ResourceNotAvailable = 3,
    MethodNotAvailable = 4,
    MissingParameters = 5,
    ParameterNotAvailable = 6,
    InvalidValue = 7,
    ParameterNotModifiable = 8,
    TooManyItems = 11,
    PortalConnectionRequired = 12,
    LinkButtonNotPressed = 101,
    InternalError = 901,
}

impl ApiErrorKind {
    pub fn create(code: i64) -> Option<Self> {
        ApiErrorKind::iter().find(|kind| kind.code() == code)
    }

    pub fn code(&self) -> i64 {
        *self as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_lookup() {
        assert_eq!(
            ApiErrorKind::create(101),
            Some(ApiErrorKind::LinkButtonNotPressed)
        );
        assert_eq!(ApiErrorKind::create(1), Some(ApiErrorKind::UnauthorizedUser));
        assert_eq!(ApiErrorKind::create(42), None);
    }

    #[test]
    fn test_device_error_message() {
        let err = Error::Device {
            method: Method::Put,
            path: "/abc/lights/1/state".into(),
            error: ApiError {
                error_type: 7,
                address: Some("/lights/1/state/bri".into()),
                description: "invalid value, 300, for parameter, bri".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "failed to PUT to '/abc/lights/1/state': invalid value, 300, for parameter, bri (type 7)"
        );
        assert_eq!(err.api_error().and_then(ApiError::kind), Some(ApiErrorKind::InvalidValue));
    }
}
