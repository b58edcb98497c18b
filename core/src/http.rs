//! HTTP descriptors and the injectable transport.
//!
//! # Design
//! Requests and responses are plain data. The core builds `HttpRequest`
//! values and reads `HttpResponse` bodies, while the network round-trip is
//! delegated to an [`HttpTransport`]. Each [`Client`](crate::Client) owns its
//! transport, so tests swap in canned responses and production code passes an
//! explicitly configured [`UreqTransport`].
//!
//! Response bodies are streams. Whoever consumes the body owns it, and
//! dropping it releases the underlying connection.

use std::fmt;
use std::io::Read;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::BoxError;

/// HTTP method for a request. The API is only ever called with GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

/// An HTTP request described as plain data.
///
/// Built by [`Request::to_http`](crate::Request::to_http).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response whose body has not been read yet.
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Box<dyn Read>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Read + 'static) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Box::new(body),
        }
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Performs a single HTTP round-trip.
///
/// Implementations may be shared between clients and called from several
/// threads at once; the client never serializes access to them.
pub trait HttpTransport: Send + Sync {
    fn perform(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

impl<F> HttpTransport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, BoxError> + Send + Sync,
{
    fn perform(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        self(request)
    }
}

/// Settings for [`UreqTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Time allowed to establish the TCP and TLS connection.
    pub connect_timeout: Duration,
    /// Time allowed for the whole call, body included.
    pub request_timeout: Duration,
    /// Time allowed between sending the request and receiving the headers.
    pub response_header_timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(15),
            response_header_timeout: Duration::from_secs(15),
            user_agent: concat!("vk-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// Non-2xx statuses are returned as responses rather than errors so the
/// client can apply its own status policy.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(config: &TransportConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(config.connect_timeout))
            .timeout_global(Some(config.request_timeout))
            .timeout_recv_response(Some(config.response_header_timeout))
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl HttpTransport for UreqTransport {
    fn perform(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.agent.get(request.url.as_str()),
        };
        builder = builder.header("user-agent", self.user_agent.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.call()?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.into_body().into_reader();

        Ok(HttpResponse {
            status,
            headers,
            body: Box::new(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn default_config_matches_protocol_timeouts() {
        let config = TransportConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.response_header_timeout, config.request_timeout);
        assert!(config.user_agent.starts_with("vk-core/"));
    }

    #[test]
    fn config_fills_missing_fields_from_defaults() {
        let config: TransportConfig =
            serde_json::from_str(r#"{"user_agent":"custom/1.0"}"#).unwrap();
        assert_eq!(config.user_agent, "custom/1.0");
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
    }

    #[test]
    fn closures_are_transports() {
        let transport = |request: HttpRequest| -> Result<HttpResponse, BoxError> {
            assert_eq!(request.method, HttpMethod::Get);
            Ok(HttpResponse::new(204, std::io::empty()))
        };
        let request = crate::Request::new("users.get").to_http();
        let response = transport.perform(request).unwrap();
        assert_eq!(response.status, 204);
        assert!(response.headers.is_empty());
    }

    #[test]
    fn http_response_debug_skips_body() {
        let response = HttpResponse::new(200, Cursor::new(b"{}".to_vec()));
        let debug = format!("{response:?}");
        assert!(debug.contains("status: 200"));
        assert!(!debug.contains("body"));
    }
}
