//! Decoding of response bodies into [`Response`] targets.
//!
//! # Design
//! The processor owns the body stream and drops it when it is done, whatever
//! the outcome, so the underlying connection is released exactly once. The
//! envelope is decoded in a single pass; only a successful decode is checked
//! for an application error.
//!
//! [`ResponseProcessor::raw`] decodes the envelope with the payload kept as a
//! [`Raw`] fragment and then decodes that fragment into whatever type the
//! caller asks for, e.g. a plain `Vec` instead of a named-field struct.

use std::io::{BufReader, Read};

use serde::de::{Deserialize, DeserializeOwned};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::raw::Raw;
use crate::request::Request;
use crate::response::{RawResponse, Response};

/// Start processing `input`.
pub fn process<R: Read>(input: R) -> ResponseProcessor<R> {
    ResponseProcessor::new(input)
}

/// Fills [`Response`] targets from a body stream.
#[derive(Debug)]
pub struct ResponseProcessor<R> {
    input: R,
    request: Option<Request>,
}

impl<R: Read> ResponseProcessor<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            request: None,
        }
    }

    /// Attach `request` to every target decoded by this processor.
    pub fn for_request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    /// Decode the envelope into `target`.
    ///
    /// On a decode failure `target` is left untouched and the error-check is
    /// skipped. Otherwise `target` is replaced by the decoded value, and an
    /// application error found in it becomes the result. The decoded payload
    /// stays in `target` in that case as well.
    pub fn to<T: Response>(self, target: &mut T) -> Result<(), ApiError> {
        let Self { input, request } = self;
        *target = decode(input)?;
        if let Some(request) = request {
            target.set_request(request);
        }

        match target.server_error() {
            Some(err) => {
                warn!(code = err.code.code(), message = %err.message, "server reported an application error");
                Err(ApiError::Server(err.clone()))
            }
            None => Ok(()),
        }
    }

    /// Decode the envelope, then decode its `response` fragment into `T`.
    ///
    /// A missing `response` field is treated as JSON `null`.
    pub fn raw<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let mut envelope = RawResponse::default();
        self.to(&mut envelope)?;
        let payload = envelope
            .response
            .unwrap_or_else(|| Raw::from(b"null".to_vec()));
        payload.decode().map_err(|err| {
            debug!(error = %err, "response fragment does not match the requested type");
            ApiError::Decode(err)
        })
    }
}

/// Reads one JSON value; anything after it is left unread.
fn decode<T: DeserializeOwned>(input: impl Read) -> Result<T, ApiError> {
    let mut de = serde_json::Deserializer::from_reader(BufReader::new(input));
    T::deserialize(&mut de).map_err(|err| {
        debug!(error = %err, "failed to decode response envelope");
        ApiError::from(err)
    })
}
