//! HTTP response handling.
//!
//! Transports hand back a [`StreamingResponse`]: status and headers are known,
//! the body is still unread. It owns the network resources of the exchange
//! until [`StreamingResponse::release`] runs (explicitly or on drop).
//!
//! [`Response`] is the buffered form produced by [`StreamingResponse::collect`].

use std::collections::HashMap;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures_core::Stream;
use futures_util::StreamExt;

/// A streaming body: chunks of bytes arriving over time.
pub type StreamingBody = Pin<Box<dyn Stream<Item = crate::Result<Bytes>> + Send>>;

/// Callback run once the resources of a response are released.
pub type ReleaseHook = Box<dyn FnOnce() + Send>;

fn normalize_headers(headers: HashMap<String, String>) -> HashMap<String, String> {
    headers
        .into_iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value))
        .collect()
}

const fn is_success(status: u16) -> bool {
    status >= 200 && status < 300
}

// ============================================================================
// Streaming Response
// ============================================================================

/// HTTP response whose body has not been consumed yet.
///
/// Releasing drops the body stream first, then runs the release hook the
/// transport attached. Release is idempotent and also happens on drop.
pub struct StreamingResponse {
    status: u16,
    headers: HashMap<String, String>,
    body: Option<StreamingBody>,
    on_release: Option<ReleaseHook>,
}

impl std::fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .field("released", &self.is_released())
            .finish()
    }
}

impl StreamingResponse {
    /// Creates a new streaming response. Header names are stored lower-case.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: StreamingBody) -> Self {
        Self {
            status,
            headers: normalize_headers(headers),
            body: Some(body),
            on_release: None,
        }
    }

    /// Creates a streaming response over an already buffered body.
    #[must_use]
    pub fn from_bytes(status: u16, headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::new(
            status,
            headers,
            Box::pin(futures_util::stream::once(async move {
                Ok::<_, crate::Error>(body)
            })),
        )
    }

    /// Attach a hook that runs once, after the body stream has been dropped.
    #[must_use]
    pub fn with_release_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers (lower-case names).
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        is_success(self.status)
    }

    /// Returns `true` once both the body and the release hook are gone.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.body.is_none() && self.on_release.is_none()
    }

    /// Take the body stream out, leaving the rest of the exchange alive.
    ///
    /// Returns `None` if the body was already taken or released.
    pub fn take_body(&mut self) -> Option<StreamingBody> {
        self.body.take()
    }

    /// Release the body stream, then the exchange. Safe to call repeatedly.
    pub fn release(&mut self) {
        drop(self.body.take());
        if let Some(hook) = self.on_release.take() {
            hook();
        }
    }

    /// Read the whole body.
    ///
    /// The body is consumed; the exchange itself stays alive until release.
    pub async fn read_body(&mut self) -> crate::Result<Bytes> {
        let Some(mut body) = self.body.take() else {
            return Ok(Bytes::new());
        };

        let mut collected = BytesMut::new();
        while let Some(chunk) = body.next().await {
            collected.extend_from_slice(&chunk?);
        }

        Ok(collected.freeze())
    }

    /// Read at most `limit` bytes of the body and drop the rest unread.
    ///
    /// The body is consumed either way; nothing past the first chunk that
    /// reaches `limit` is pulled from the transport.
    pub async fn read_body_limited(&mut self, limit: usize) -> crate::Result<Bytes> {
        let Some(mut body) = self.body.take() else {
            return Ok(Bytes::new());
        };

        let mut collected = BytesMut::new();
        while collected.len() < limit {
            let Some(chunk) = body.next().await else {
                break;
            };
            collected.extend_from_slice(&chunk?);
        }
        collected.truncate(limit);

        Ok(collected.freeze())
    }

    /// Buffer the entire body into a [`Response`] and release the exchange.
    pub async fn collect(mut self) -> crate::Result<Response<Bytes>> {
        let body = self.read_body().await?;
        self.release();
        Ok(Response::new(self.status, self.headers.clone(), body))
    }
}

impl Drop for StreamingResponse {
    fn drop(&mut self) {
        self.release();
    }
}

// ============================================================================
// Buffered Response
// ============================================================================

/// HTTP response with status, headers, and a buffered body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response. Header names are stored lower-case.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        Self {
            status,
            headers: normalize_headers(headers),
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers (lower-case names).
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        is_success(self.status)
    }

    /// Returns `true` if the `Content-Type` header denotes JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .is_some_and(crate::ContentType::is_json)
    }
}

impl Response<Bytes> {
    /// Deserialize the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        crate::from_json(&self.body)
    }

    /// Get the response body as text.
    pub fn text(self) -> crate::Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| crate::Error::interpret(crate::DecodeError::Utf8(e)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert2::{check, let_assert};

    use super::*;

    fn json_headers() -> HashMap<String, String> {
        HashMap::from([(
            "Content-Type".to_string(),
            "application/json; charset=utf-8".to_string(),
        )])
    }

    #[test]
    fn response_headers_are_case_insensitive() {
        let response = Response::new(200, json_headers(), Bytes::from(r#"{"id":1}"#));

        check!(response.status() == 200);
        check!(response.header("content-type") == Some("application/json; charset=utf-8"));
        check!(response.header("CONTENT-TYPE").is_some());
        check!(response.is_success());
        check!(response.is_json());
    }

    #[test]
    fn response_json() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct User {
            login: String,
        }

        let response = Response::new(200, json_headers(), Bytes::from(r#"{"login":"alice"}"#));
        let user: User = response.json().expect("deserialize");
        check!(user.login == "alice");
    }

    #[test]
    fn response_text_rejects_invalid_utf8() {
        let response = Response::new(200, HashMap::new(), Bytes::from_static(&[0xc3, 0x28]));
        let_assert!(Err(err) = response.text());
        check!(err.is_interpret_failure());
    }

    #[tokio::test]
    async fn streaming_collect_releases() {
        let hooks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hooks);

        let chunks = futures_util::stream::iter(vec![
            Ok::<_, crate::Error>(Bytes::from_static(b"hello, ")),
            Ok(Bytes::from_static(b"world")),
        ]);
        let response = StreamingResponse::new(200, HashMap::new(), Box::pin(chunks))
            .with_release_hook(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        let buffered = response.collect().await.expect("collect");
        check!(buffered.body().as_ref() == b"hello, world");
        check!(hooks.load(Ordering::SeqCst) == 1);
    }

    #[test]
    fn release_is_idempotent() {
        let hooks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hooks);

        let mut response = StreamingResponse::from_bytes(204, HashMap::new(), Bytes::new())
            .with_release_hook(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        check!(!response.is_released());
        response.release();
        response.release();
        check!(response.is_released());
        drop(response);
        check!(hooks.load(Ordering::SeqCst) == 1);
    }

    #[tokio::test]
    async fn read_body_limited_stops_at_the_limit() {
        let chunks = futures_util::stream::iter(vec![
            Ok(Bytes::from_static(b"abcd")),
            Ok(Bytes::from_static(b"efgh")),
            Err(crate::Error::connection("never polled")),
        ]);
        let mut response = StreamingResponse::new(502, HashMap::new(), Box::pin(chunks));

        let_assert!(Ok(body) = response.read_body_limited(6).await);
        check!(body.as_ref() == b"abcdef");
        check!(response.take_body().is_none());
    }

    #[tokio::test]
    async fn read_body_limited_short_body() {
        let mut response = StreamingResponse::from_bytes(500, HashMap::new(), "oops");
        let_assert!(Ok(body) = response.read_body_limited(1024).await);
        check!(body.as_ref() == b"oops");
    }

    #[tokio::test]
    async fn read_body_after_take_is_empty() {
        let mut response = StreamingResponse::from_bytes(200, HashMap::new(), "payload");
        let _body = response.take_body();
        let body = response.read_body().await.expect("read");
        check!(body.is_empty());
    }
}
