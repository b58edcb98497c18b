//! Synchronous client for the API.
//!
//! # Design
//! `Client` holds only its transport. A call builds the HTTP request from the
//! [`Request`], performs exactly one round-trip, rejects any status other
//! than 200 without reading the body, and hands the body to the
//! [`ResponseProcessor`](crate::ResponseProcessor). Nothing is retried.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpTransport, TransportConfig, UreqTransport};
use crate::processor::process;
use crate::request::Request;
use crate::response::Response;

const STATUS_OK: u16 = 200;

/// API client bound to one transport.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn HttpTransport>,
}

impl Client {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Client backed by a [`UreqTransport`] built from `config`.
    pub fn with_config(config: &TransportConfig) -> Self {
        Self::new(Arc::new(UreqTransport::new(config)))
    }

    pub fn set_transport(&mut self, transport: Arc<dyn HttpTransport>) {
        self.transport = transport;
    }

    /// Perform `request` and decode the envelope into `response`.
    ///
    /// `response` remembers `request` even when the call fails before the body
    /// is decoded.
    pub fn execute<R: Response>(&self, request: Request, response: &mut R) -> Result<(), ApiError> {
        response.set_request(request.clone());
        let body = self.send(&request)?;
        process(body).for_request(request).to(response)
    }

    /// Perform `request` and decode only its `response` payload into `T`.
    pub fn execute_raw<T: DeserializeOwned>(&self, request: Request) -> Result<T, ApiError> {
        let body = self.send(&request)?;
        process(body).raw()
    }

    fn send(&self, request: &Request) -> Result<Box<dyn Read>, ApiError> {
        debug!(method = %request.method, "calling API method");
        let response = self
            .transport
            .perform(request.to_http())
            .map_err(ApiError::Transport)?;
        if response.status != STATUS_OK {
            warn!(method = %request.method, status = response.status, "unexpected HTTP status");
            return Err(ApiError::BadResponseCode);
        }
        Ok(response.body)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::with_config(&TransportConfig::default())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}
