//! HTTP exchange with the bridge and the discovery service.

use std::future::Future;
use std::time::Duration;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::Display;
use url::Url;

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// HTTP verbs used against the bridge API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One stateless request/response exchange.
///
/// Implementations return the raw response body; interpreting it is left to
/// the caller. HTTP status codes are not treated as failures because the
/// bridge reports its errors inside the body.
pub trait Transport: Send + Sync {
    /// Send `body` (if any) as JSON to `url` and return the response text.
    fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Settings for building an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    /// Skip certificate validation; the bridge serves a self-signed certificate.
    pub accept_invalid_certs: bool,
}

impl TransportConfig {
    /// Settings for talking to the bridge itself.
    pub fn device(timeout: Duration) -> Self {
        Self {
            timeout,
            accept_invalid_certs: true,
        }
    }

    /// Settings for public endpoints with real certificates.
    pub fn public(timeout: Duration) -> Self {
        Self {
            timeout,
            accept_invalid_certs: false,
        }
    }
}

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(concat!("hue-bridge-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::network("build client", e))?;
        Ok(Self { http })
    }

    /// Wrap an already configured client.
    pub fn from_reqwest(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, method: Method, url: &Url, body: Option<&Value>) -> Result<String> {
        debug!("{} {}", method, url);

        let mut request = self.http.request(method.into(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::network("send", e))?;
        let text = response
            .text()
            .await
            .map_err(|e| Error::network("receive", e))?;

        trace!("{} {} -> {}", method, url, text);
        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// A request captured by [`ScriptedTransport`].
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Recorded {
        pub method: Method,
        pub url: String,
        pub body: Option<Value>,
    }

    /// Replays canned responses in order and records every request.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<String>>>,
        requests: Mutex<Vec<Recorded>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(responses: impl IntoIterator<Item = Value>) -> Self {
            let transport = Self::new();
            for response in responses {
                transport.push(response);
            }
            transport
        }

        pub fn push(&self, response: Value) {
            self.push_raw(&response.to_string());
        }

        pub fn push_raw(&self, body: &str) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(body.to_string()));
        }

        pub fn push_error(&self, err: Error) {
            self.responses.lock().unwrap().push_back(Err(err));
        }

        pub fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(&self, method: Method, url: &Url, body: Option<&Value>) -> Result<String> {
            self.requests.lock().unwrap().push(Recorded {
                method,
                url: url.to_string(),
                body: body.cloned(),
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::network("send", "no scripted response left")))
        }
    }
}
