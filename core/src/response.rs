//! The contract every decode target satisfies.
//!
//! # Design
//! A target is decoded from the whole envelope in one pass, so its shape is
//! fixed before the reply is known: it declares both the `error` object and
//! the `response` payload, and either may end up populated. [`Envelope`] is
//! the ready-made target for any payload type; hand-written targets implement
//! [`Response`] themselves.
//!
//! When the server reports an application error the target is still left as
//! decoded. Whatever part of `response` the server sent remains readable next
//! to the error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::raw::Raw;
use crate::request::Request;

/// A decode target for a response envelope.
pub trait Response: DeserializeOwned {
    /// The application error carried by the decoded envelope, if any.
    fn server_error(&self) -> Option<&ServerError>;

    /// Remember the request this response answers.
    fn set_request(&mut self, request: Request);
}

/// Generic envelope target: `{"error": {...}}` or `{"response": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Envelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServerError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<T>,
    /// The request this envelope was decoded for. Never read from the wire.
    #[serde(skip)]
    pub request: Option<Request>,
}

/// Envelope whose payload is kept undecoded.
pub type RawResponse = Envelope<Raw>;

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self {
            error: None,
            response: None,
            request: None,
        }
    }
}

impl<T: DeserializeOwned> Response for Envelope<T> {
    fn server_error(&self) -> Option<&ServerError> {
        self.error.as_ref()
    }

    fn set_request(&mut self, request: Request) {
        self.request = Some(request);
    }
}
