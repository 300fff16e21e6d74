//! Response interpretation.
//!
//! [`interpret`] turns a pending exchange into the result an endpoint
//! declares. The shape of that result is picked per call site through a
//! [`Decoding`] strategy type:
//!
//! | Strategy            | Output                     | Status check |
//! |---------------------|----------------------------|--------------|
//! | [`AsJson<T>`]       | `T`                        | yes          |
//! | [`AsText`]          | `String`                   | yes          |
//! | [`AsBinary`]        | `Bytes`                    | yes          |
//! | [`AsStatusOnly`]    | [`StatusOutcome`]          | no           |
//! | [`AsStreamHandle`]  | [`CallerOwned<Download>`]  | yes          |
//!
//! Every strategy except [`AsStreamHandle`] consumes and releases the
//! response before returning. The stream handle leaves the response open and
//! hands it to the caller.
//!
//! ```ignore
//! let user = interpret::<AsJson<User>, _>(transport.send(request), &cancel).await?;
//! ```

use std::any::{Any, TypeId};
use std::future::Future;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::owned::content_disposition_file_name;
use crate::{
    CallerOwned, ContentType, DecodeError, Download, Error, Result, StatusOutcome, StreamingResponse,
    extract_message, from_json,
};

// ============================================================================
// Decoding Kinds
// ============================================================================

/// The kind of result a [`Decoding`] strategy produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodingKind {
    /// Deserialize the body as JSON.
    Json,
    /// Read the body as UTF-8 text.
    Text,
    /// Read the body as raw bytes.
    Binary,
    /// Report the status code, never fail on it.
    StatusOnly,
    /// Hand the open body stream to the caller.
    StreamHandle,
}

impl DecodingKind {
    /// Get the kind name used in log events.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Binary => "binary",
            Self::StatusOnly => "status-only",
            Self::StreamHandle => "stream-handle",
        }
    }

    /// Whether a non-2xx status is turned into [`Error::Response`].
    #[must_use]
    pub const fn checks_status(&self) -> bool {
        !matches!(self, Self::StatusOnly)
    }

    /// Whether a successful decode leaves the response open.
    #[must_use]
    pub const fn transfers_ownership(&self) -> bool {
        matches!(self, Self::StreamHandle)
    }
}

impl std::fmt::Display for DecodingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Strategies
// ============================================================================

/// A way of decoding a successful response.
///
/// Implementations receive the response only after the status check has
/// passed (or, for [`AsStatusOnly`], without one). Unless they return a
/// [`CallerOwned`], they must release the response before returning.
pub trait Decoding {
    /// The decoded value.
    type Output: Send;

    /// The kind of this strategy.
    const KIND: DecodingKind;

    /// Decode the response.
    fn decode(response: StreamingResponse) -> impl Future<Output = Result<Self::Output>> + Send;
}

/// Marker payload for endpoints that answer with no meaningful body.
///
/// `AsJson<Empty>` never parses: whatever the body holds is discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Empty;

/// Decode the body as JSON into `T`.
pub struct AsJson<T>(PhantomData<fn() -> T>);

impl<T> std::fmt::Debug for AsJson<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AsJson<{}>", std::any::type_name::<T>())
    }
}

impl<T> Clone for AsJson<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AsJson<T> {}

impl<T> Default for AsJson<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

/// Decode the body as UTF-8 text.
#[derive(Debug, Clone, Copy)]
pub struct AsText;

/// Return the body bytes as-is.
#[derive(Debug, Clone, Copy)]
pub struct AsBinary;

/// Report the status code and the body `message`, if any.
#[derive(Debug, Clone, Copy)]
pub struct AsStatusOnly;

/// Hand the open body stream to the caller as a [`Download`].
#[derive(Debug, Clone, Copy)]
pub struct AsStreamHandle;

impl<T> Decoding for AsJson<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    const KIND: DecodingKind = DecodingKind::Json;

    async fn decode(mut response: StreamingResponse) -> Result<T> {
        if TypeId::of::<T>() == TypeId::of::<Empty>() {
            response.release();
            let empty: Box<dyn Any + Send> = Box::new(Empty);
            return empty
                .downcast::<T>()
                .map(|value| *value)
                .map_err(|_| Error::unexpected("empty marker type mismatch"));
        }

        let body = response.read_body().await?;
        response.release();
        from_json(&body)
    }
}

impl Decoding for AsText {
    type Output = String;

    const KIND: DecodingKind = DecodingKind::Text;

    async fn decode(mut response: StreamingResponse) -> Result<String> {
        let body = response.read_body().await?;
        response.release();
        String::from_utf8(body.to_vec()).map_err(|e| Error::interpret(DecodeError::Utf8(e)))
    }
}

impl Decoding for AsBinary {
    type Output = Bytes;

    const KIND: DecodingKind = DecodingKind::Binary;

    async fn decode(mut response: StreamingResponse) -> Result<Bytes> {
        let body = response.read_body().await?;
        response.release();
        Ok(body)
    }
}

impl Decoding for AsStatusOnly {
    type Output = StatusOutcome;

    const KIND: DecodingKind = DecodingKind::StatusOnly;

    async fn decode(mut response: StreamingResponse) -> Result<StatusOutcome> {
        let code = response.status();
        let message = if is_json(&response) {
            response
                .read_body()
                .await
                .ok()
                .and_then(|body| extract_message(&body))
        } else {
            None
        };
        response.release();

        Ok(StatusOutcome::new(code, message))
    }
}

impl Decoding for AsStreamHandle {
    type Output = CallerOwned<Download>;

    const KIND: DecodingKind = DecodingKind::StreamHandle;

    async fn decode(mut response: StreamingResponse) -> Result<CallerOwned<Download>> {
        let file_name = response
            .header("content-disposition")
            .and_then(content_disposition_file_name);
        let Some(stream) = response.take_body() else {
            return Err(Error::unexpected("response body is no longer available"));
        };

        Ok(CallerOwned::new(Download::new(stream, file_name), response))
    }
}

// ============================================================================
// Interpreter
// ============================================================================

/// Await a pending exchange and decode it with strategy `S`.
///
/// - Transport failures are returned unchanged.
/// - A non-2xx status yields [`Error::Response`] (except for
///   [`AsStatusOnly`]), carrying the body `message` when the body is JSON and
///   `HTTP {status}` otherwise.
/// - Decode failures not already classified become [`Error::Interpret`].
/// - Cancelling `cancel` while awaiting the exchange or reading the body
///   yields [`Error::Cancelled`].
///
/// On every error path the response is released before returning.
pub async fn interpret<S, F>(pending: F, cancel: &CancellationToken) -> Result<S::Output>
where
    S: Decoding,
    F: Future<Output = Result<StreamingResponse>>,
{
    let response = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            debug!(kind = %S::KIND, "call cancelled before the response arrived");
            return Err(Error::Cancelled);
        }
        result = pending => result?,
    };

    let status = response.status();
    debug!(status, kind = %S::KIND, "interpreting response");

    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        result = classify_and_decode::<S>(response) => result,
    };

    match &outcome {
        Err(err) if is_routine(err) => {
            debug!(status, kind = %S::KIND, error = %err, "response interpretation stopped");
        }
        Err(err) => {
            warn!(status, kind = %S::KIND, error = %err, "response interpretation failed");
        }
        Ok(_) => {}
    }
    outcome
}

/// Outcomes callers expect in normal operation: cancellation and "not found".
fn is_routine(err: &Error) -> bool {
    err.is_cancelled() || err.is_not_found()
}

async fn classify_and_decode<S: Decoding>(response: StreamingResponse) -> Result<S::Output> {
    if S::KIND.checks_status() && !response.is_success() {
        return Err(error_response(response).await);
    }

    S::decode(response)
        .await
        .map_err(Error::into_interpret_failure)
}

/// Largest error body kept on [`Error::Response`]; the rest is never read.
const MAX_ERROR_BODY: usize = 64 * 1024;

/// Build the error for a non-2xx response, reading its body best-effort.
async fn error_response(mut response: StreamingResponse) -> Error {
    let status = response.status();
    let json = is_json(&response);
    let body = response
        .read_body_limited(MAX_ERROR_BODY)
        .await
        .ok()
        .filter(|body| !body.is_empty());
    response.release();

    let message = body
        .as_deref()
        .filter(|_| json)
        .and_then(extract_message)
        .unwrap_or_else(|| format!("HTTP {status}"));

    match body {
        Some(body) => Error::response_with_body(status, message, body),
        None => Error::response(status, message),
    }
}

fn is_json(response: &StreamingResponse) -> bool {
    response
        .header("content-type")
        .is_some_and(ContentType::is_json)
}
