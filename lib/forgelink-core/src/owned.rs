//! Results whose network resources belong to the caller.
//!
//! Archive and raw-file downloads must not be buffered: the caller reads the
//! body stream itself. [`CallerOwned`] keeps that stream together with the
//! still-open response, and releasing it closes both, stream first.
//!
//! ```ignore
//! let mut archive = client.download(request).await?;
//! let name = archive.file_name().unwrap_or("archive.zip").to_string();
//! while let Some(chunk) = archive.payload_mut().unwrap().next().await {
//!     file.write_all(&chunk?).await?;
//! }
//! archive.release();
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_core::Stream;
use futures_util::StreamExt;
use percent_encoding::percent_decode_str;
use tracing::trace;

use crate::{Result, StreamingBody, StreamingResponse};

// ============================================================================
// Download Handle
// ============================================================================

/// A body stream plus the file name the server suggested for it.
///
/// It does not own the connection; it lives inside a [`CallerOwned`].
pub struct Download {
    stream: StreamingBody,
    file_name: Option<String>,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

impl Download {
    /// Creates a new download handle.
    #[must_use]
    pub fn new(stream: StreamingBody, file_name: Option<String>) -> Self {
        Self { stream, file_name }
    }

    /// File name from the `Content-Disposition` header, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Read the rest of the stream into memory.
    pub async fn bytes(&mut self) -> Result<Bytes> {
        let mut collected = BytesMut::new();
        while let Some(chunk) = self.stream.next().await {
            collected.extend_from_slice(&chunk?);
        }
        Ok(collected.freeze())
    }
}

impl Stream for Download {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.as_mut().poll_next(cx)
    }
}

// ============================================================================
// Caller-Owned Result
// ============================================================================

/// A decoded payload together with the response it still depends on.
///
/// Created by the response interpreter once the status check has passed.
/// From then on the caller owns both parts and should call
/// [`release`](Self::release) when done; dropping the wrapper releases too.
/// Release drops the payload before the response, and runs at most once.
pub struct CallerOwned<T> {
    payload: Option<T>,
    response: Option<StreamingResponse>,
    released: bool,
}

impl<T: std::fmt::Debug> std::fmt::Debug for CallerOwned<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallerOwned")
            .field("payload", &self.payload)
            .field("response", &self.response)
            .field("released", &self.released)
            .finish()
    }
}

impl<T> CallerOwned<T> {
    pub(crate) fn new(payload: T, response: StreamingResponse) -> Self {
        Self {
            payload: Some(payload),
            response: Some(response),
            released: false,
        }
    }

    /// The payload, until released.
    #[must_use]
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    /// Mutable access to the payload, until released.
    #[must_use]
    pub fn payload_mut(&mut self) -> Option<&mut T> {
        self.payload.as_mut()
    }

    /// Status of the underlying response, until released.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(StreamingResponse::status)
    }

    /// Header of the underlying response, until released.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.response.as_ref().and_then(|response| response.header(name))
    }

    /// Returns `true` once [`release`](Self::release) has run.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.released
    }

    /// Release the payload, then the underlying response.
    ///
    /// Calling it again is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        drop(self.payload.take());
        if let Some(mut response) = self.response.take() {
            response.release();
        }
        trace!("caller-owned result released");
    }
}

impl<T> Drop for CallerOwned<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl CallerOwned<Download> {
    /// Suggested file name of the download.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.payload.as_ref().and_then(Download::file_name)
    }

    /// Read the whole download, then release everything.
    pub async fn into_bytes(mut self) -> Result<Bytes> {
        let bytes = match self.payload.as_mut() {
            Some(download) => download.bytes().await,
            None => Ok(Bytes::new()),
        };
        self.release();
        bytes
    }
}

// ============================================================================
// Content-Disposition
// ============================================================================

/// Extract the file name from a `Content-Disposition` header value.
///
/// The RFC 5987 extended form (`filename*=UTF-8''na%C3%AFve.txt`) wins over
/// the plain `filename` parameter. Returns `None` when neither yields a
/// non-empty name.
#[must_use]
pub fn content_disposition_file_name(value: &str) -> Option<String> {
    let mut plain = None;

    for param in split_params(value).into_iter().skip(1) {
        let Some((name, raw)) = param.split_once('=') else {
            continue;
        };
        let name = name.trim();
        let raw = raw.trim();

        if name.eq_ignore_ascii_case("filename*") {
            if let Some(decoded) = decode_ext_value(raw).filter(|v| !v.is_empty()) {
                return Some(decoded);
            }
        } else if name.eq_ignore_ascii_case("filename") && plain.is_none() {
            plain = Some(unquote(raw)).filter(|v| !v.is_empty());
        }
    }

    plain
}

/// Split on `;` outside of quoted strings.
fn split_params(value: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, ch) in value.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                params.push(value.get(start..idx).unwrap_or_default());
                start = idx + 1;
            }
            _ => {}
        }
    }
    params.push(value.get(start..).unwrap_or_default());

    params
}

fn unquote(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Decode `charset'language'percent-encoded-value`.
fn decode_ext_value(raw: &str) -> Option<String> {
    let raw = unquote(raw);
    let mut parts = raw.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;

    let bytes: Vec<u8> = percent_decode_str(encoded).collect();
    if charset.eq_ignore_ascii_case("iso-8859-1") {
        Some(bytes.into_iter().map(char::from).collect())
    } else {
        String::from_utf8(bytes).ok()
    }
}
