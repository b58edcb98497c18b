//! Error types for the API client.
//!
//! # Design
//! Transport failures, bad HTTP statuses, body decoding failures and
//! application errors each get their own variant so callers can react without
//! inspecting messages. Application errors arrive inside HTTP 200 envelopes
//! and are surfaced as [`ServerError`], which keeps the numeric code, the
//! server's message and the request parameters the server echoed back.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error produced by an [`HttpTransport`](crate::http::HttpTransport).
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Errors returned by [`Client`](crate::Client) and
/// [`ResponseProcessor`](crate::ResponseProcessor).
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport could not perform the request. The transport's own error
    /// is kept as-is.
    #[error(transparent)]
    Transport(BoxError),

    /// The server answered with a status other than 200. The body is not read.
    #[error("bad response code")]
    BadResponseCode,

    /// Reading the response body failed.
    #[error("failed to read response body")]
    Io(#[from] io::Error),

    /// The response body, or the deferred `response` fragment, is not valid
    /// JSON for the requested target.
    #[error("malformed response JSON")]
    Decode(#[source] serde_json::Error),

    /// The server reported an application error inside a 200 response.
    #[error(transparent)]
    Server(#[from] ServerError),
}

impl ApiError {
    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Server(_))
    }

    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            ApiError::Server(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            ApiError::Io(err.into())
        } else {
            ApiError::Decode(err)
        }
    }
}

/// Reports whether `err` is an application error, either directly or wrapped
/// in an [`ApiError`].
pub fn is_server_error(err: &(dyn StdError + 'static)) -> bool {
    as_server_error(err).is_some()
}

/// Extracts the application error carried by `err`, if any.
pub fn as_server_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a ServerError> {
    if let Some(api) = err.downcast_ref::<ApiError>() {
        return api.server_error();
    }
    err.downcast_ref::<ServerError>()
}

/// The `error` object of a response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("application error {code}: {message}")]
pub struct ServerError {
    #[serde(rename = "error_code")]
    pub code: ErrorCode,
    #[serde(rename = "error_msg", default)]
    pub message: String,
    #[serde(default)]
    pub request_params: Vec<RequestParam>,
}

/// One request parameter echoed back by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParam {
    pub key: String,
    pub value: String,
}

/// Application error codes.
///
/// Codes outside the known catalog decode to [`ErrorCode::Unrecognized`]
/// rather than failing, and encode back to the same integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ErrorCode {
    UnknownError,
    AppDisabled,
    UnknownMethod,
    IncorrectSignature,
    AuthorizationFailed,
    TooManyRequests,
    PermissionDenied,
    InvalidRequest,
    FloodControl,
    InternalServerError,
    TestMode,
    CaptchaNeeded,
    AccessDenied,
    HttpsRequired,
    ValidationRequired,
    NonStandaloneDenied,
    StandaloneOnly,
    MethodDisabled,
    InvalidParameter,
    InvalidAppId,
    InvalidUserId,
    InvalidTimestamp,
    AlbumAccessDenied,
    AudioAccessDenied,
    GroupAccessDenied,
    AlbumFull,
    /// A code the catalog does not know.
    Unrecognized(i64),
}

const CATALOG: &[(ErrorCode, i64, &str)] = &[
    (ErrorCode::UnknownError, 1, "unknown error occurred"),
    (ErrorCode::AppDisabled, 2, "application is disabled"),
    (ErrorCode::UnknownMethod, 3, "unknown method passed"),
    (ErrorCode::IncorrectSignature, 4, "incorrect signature"),
    (ErrorCode::AuthorizationFailed, 5, "user authorization failed"),
    (ErrorCode::TooManyRequests, 6, "too many requests per second"),
    (ErrorCode::PermissionDenied, 7, "permission to perform this action is denied"),
    (ErrorCode::InvalidRequest, 8, "invalid request"),
    (ErrorCode::FloodControl, 9, "flood control"),
    (ErrorCode::InternalServerError, 10, "internal server error"),
    (ErrorCode::TestMode, 11, "application must be disabled in test mode"),
    (ErrorCode::CaptchaNeeded, 14, "captcha needed"),
    (ErrorCode::AccessDenied, 15, "access denied"),
    (ErrorCode::HttpsRequired, 16, "HTTP authorization failed"),
    (ErrorCode::ValidationRequired, 17, "validation required"),
    (ErrorCode::NonStandaloneDenied, 20, "permission denied for non-standalone applications"),
    (ErrorCode::StandaloneOnly, 21, "permission allowed only for standalone applications"),
    (ErrorCode::MethodDisabled, 23, "method was disabled"),
    (ErrorCode::InvalidParameter, 100, "one of the parameters specified was missing or invalid"),
    (ErrorCode::InvalidAppId, 101, "invalid application API ID"),
    (ErrorCode::InvalidUserId, 113, "invalid user id"),
    (ErrorCode::InvalidTimestamp, 150, "invalid timestamp"),
    (ErrorCode::AlbumAccessDenied, 200, "access to album denied"),
    (ErrorCode::AudioAccessDenied, 201, "access to audio denied"),
    (ErrorCode::GroupAccessDenied, 203, "access to group denied"),
    (ErrorCode::AlbumFull, 300, "album is full"),
];

impl ErrorCode {
    /// Look `code` up in the catalog.
    pub fn from_code(code: i64) -> Self {
        CATALOG
            .iter()
            .find(|(_, known, _)| *known == code)
            .map_or(ErrorCode::Unrecognized(code), |(kind, _, _)| *kind)
    }

    /// The numeric code as sent on the wire.
    pub fn code(self) -> i64 {
        match self {
            ErrorCode::Unrecognized(code) => code,
            kind => CATALOG
                .iter()
                .find(|(known, _, _)| *known == kind)
                .map_or(0, |(_, code, _)| *code),
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, ErrorCode::Unrecognized(_))
    }

    pub fn description(self) -> &'static str {
        CATALOG
            .iter()
            .find(|(known, _, _)| *known == self)
            .map_or("unknown application error", |(_, _, text)| *text)
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        ErrorCode::from_code(code)
    }
}

impl From<ErrorCode> for i64 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}
