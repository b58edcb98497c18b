//! Synchronous client core for the VK JSON-over-HTTP API.
//!
//! # Overview
//! Every call is a `GET https://api.vk.com/method/<method>` whose reply is a
//! JSON envelope holding either a `response` payload or an `error` object,
//! both inside an HTTP 200. This crate builds those requests, decodes the
//! envelopes into caller-defined targets, and classifies application errors
//! so callers can match on their codes.
//!
//! # Design
//! - [`Request::to_http`] is pure; the network round-trip belongs to an
//!   injectable [`HttpTransport`], with [`UreqTransport`] as the default.
//! - [`ResponseProcessor`] decodes a body stream either into a fixed-shape
//!   [`Response`] target or, through [`Raw`], into any type the caller picks.
//! - [`Client`] glues the two together for one call. It never retries.
//!
//! ```no_run
//! use vk_core::{Client, Envelope, Request};
//!
//! #[derive(serde::Deserialize)]
//! struct User {
//!     id: i64,
//!     first_name: String,
//! }
//!
//! let client = Client::default();
//! let mut users = Envelope::<Vec<User>>::default();
//! client.execute(Request::new("users.get").param("user_ids", "1"), &mut users)?;
//! # Ok::<(), vk_core::ApiError>(())
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod processor;
pub mod raw;
pub mod request;
pub mod response;

pub use client::Client;
pub use error::{as_server_error, is_server_error, ApiError, BoxError, ErrorCode, RequestParam, ServerError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportConfig, UreqTransport};
pub use processor::{process, ResponseProcessor};
pub use raw::Raw;
pub use request::{Params, Request};
pub use response::{Envelope, RawResponse, Response};
