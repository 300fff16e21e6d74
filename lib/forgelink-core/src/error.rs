//! Error types for forgelink.
//!
//! Every call either yields its decoded value or exactly one [`Error`]. Three
//! variants are produced by the response interpreter and classify the remote
//! outcome:
//!
//! - [`Error::Response`] - the remote answered with a non-2xx status
//! - [`Error::UnexpectedResponse`] - the response violated the endpoint contract
//! - [`Error::Interpret`] - the status was fine but the body could not be decoded
//!
//! The remaining variants come from the transport (connection, TLS, timeout)
//! or from building the request.

use derive_more::{Display, Error, From};

// ============================================================================
// Decode Failure Cause
// ============================================================================

/// The underlying cause of an [`Error::Interpret`].
#[derive(Debug, Display, Error)]
pub enum DecodeError {
    /// The body was not valid JSON for the requested type.
    #[display("invalid JSON at '{path}': {message}")]
    Json {
        /// JSON path to the failing field (e.g. `owner.login`).
        path: String,
        /// Deserializer message.
        message: String,
    },

    /// The body was not valid UTF-8.
    #[display("body is not valid UTF-8: {_0}")]
    Utf8(std::string::FromUtf8Error),

    /// Reading the body from the transport failed.
    #[display("failed to read body: {_0}")]
    Body(Box<Error>),
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for forgelink operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The remote rejected the request with a non-2xx status.
    #[display("HTTP error {status}: {message}")]
    #[from(skip)]
    Response {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the body, or a status-derived fallback.
        message: String,
        /// Raw error body, if one was read.
        #[error(not(source))]
        body: Option<bytes::Bytes>,
    },

    /// The response did not match any shape the endpoint declares.
    #[display("unexpected response: {_0}")]
    #[from(skip)]
    UnexpectedResponse(#[error(not(source))] String),

    /// A successful response whose body could not be decoded.
    #[display("failed to interpret response: {message}")]
    #[from(skip)]
    Interpret {
        /// Human readable summary.
        message: String,
        /// What went wrong while decoding.
        source: DecodeError,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// The transport timeout elapsed before the response arrived.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The caller cancelled the call.
    #[display("request cancelled")]
    #[from(skip)]
    Cancelled,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error while building a request body.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error response from status code and message.
    #[must_use]
    pub fn response(status: u16, message: impl Into<String>) -> Self {
        Self::Response {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create an error response that keeps the raw body.
    #[must_use]
    pub fn response_with_body(status: u16, message: impl Into<String>, body: bytes::Bytes) -> Self {
        Self::Response {
            status,
            message: message.into(),
            body: Some(body),
        }
    }

    /// Create an unexpected response error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse(message.into())
    }

    /// Create an interpret failure from its cause.
    #[must_use]
    pub fn interpret(source: DecodeError) -> Self {
        Self::Interpret {
            message: source.to_string(),
            source,
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON decoding failure with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::interpret(DecodeError::Json {
            path: path.into(),
            message: message.into(),
        })
    }

    /// Returns `true` for the three kinds produced by the response interpreter,
    /// plus cancellation. These are never re-wrapped.
    #[must_use]
    pub const fn is_classified(&self) -> bool {
        matches!(
            self,
            Self::Response { .. } | Self::UnexpectedResponse(_) | Self::Interpret { .. } | Self::Cancelled
        )
    }

    /// Wrap an unclassified error raised while decoding a body.
    ///
    /// Classified errors pass through unchanged, so wrapping happens at most once.
    #[must_use]
    pub fn into_interpret_failure(self) -> Self {
        if self.is_classified() {
            self
        } else {
            Self::interpret(DecodeError::Body(Box::new(self)))
        }
    }

    /// Returns `true` if the remote rejected the request.
    #[must_use]
    pub const fn is_error_response(&self) -> bool {
        matches!(self, Self::Response { .. })
    }

    /// Returns `true` if the response shape was not recognized.
    #[must_use]
    pub const fn is_unexpected_response(&self) -> bool {
        matches!(self, Self::UnexpectedResponse(_))
    }

    /// Returns `true` if the body could not be decoded.
    #[must_use]
    pub const fn is_interpret_failure(&self) -> bool {
        matches!(self, Self::Interpret { .. })
    }

    /// Returns `true` if the call was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns the HTTP status code if the remote rejected the request.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the message of an error response.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Response { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns the raw body of an error response, if it was read.
    #[must_use]
    pub fn body(&self) -> Option<&bytes::Bytes> {
        match self {
            Self::Response { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Try to decode the body of an error response as JSON.
    ///
    /// Returns `None` if there is no body or this is not an error response.
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::from_json(body))
    }
}
