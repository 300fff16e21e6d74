//! In-memory responses that record when their resources are released.

use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;

use crate::{Result, StreamingResponse};

/// Records release events of one response, in order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Probe {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl Probe {
    fn push(&self, event: &'static str) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub(crate) fn events(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of times the body stream was dropped.
    pub(crate) fn stream_drops(&self) -> usize {
        self.events().iter().filter(|e| **e == "stream").count()
    }

    /// Number of times the release hook ran.
    pub(crate) fn releases(&self) -> usize {
        self.events().iter().filter(|e| **e == "response").count()
    }
}

struct TrackedBody {
    chunks: VecDeque<Result<Bytes>>,
    stall: bool,
    probe: Probe,
}

impl Stream for TrackedBody {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.chunks.pop_front() {
            Some(chunk) => Poll::Ready(Some(chunk)),
            None if self.stall => Poll::Pending,
            None => Poll::Ready(None),
        }
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.probe.push("stream");
    }
}

/// A response over `chunks` whose body drop and release hook are recorded.
pub(crate) fn tracked_chunks(
    status: u16,
    headers: &[(&str, &str)],
    chunks: Vec<Result<Bytes>>,
) -> (StreamingResponse, Probe) {
    build(status, headers, chunks, false)
}

/// A response whose body never finishes arriving.
pub(crate) fn stalled(status: u16, headers: &[(&str, &str)]) -> (StreamingResponse, Probe) {
    build(status, headers, Vec::new(), true)
}

fn build(
    status: u16,
    headers: &[(&str, &str)],
    chunks: Vec<Result<Bytes>>,
    stall: bool,
) -> (StreamingResponse, Probe) {
    let probe = Probe::default();
    let headers: HashMap<String, String> = headers
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect();

    let body = TrackedBody {
        chunks: chunks.into(),
        stall,
        probe: probe.clone(),
    };
    let hook_probe = probe.clone();
    let response = StreamingResponse::new(status, headers, Box::pin(body))
        .with_release_hook(move || hook_probe.push("response"));

    (response, probe)
}

/// A response with a single-chunk body.
pub(crate) fn tracked(
    status: u16,
    headers: &[(&str, &str)],
    body: &'static [u8],
) -> (StreamingResponse, Probe) {
    tracked_chunks(status, headers, vec![Ok(Bytes::from_static(body))])
}

/// `Content-Type: application/json`.
pub(crate) const JSON: (&str, &str) = ("Content-Type", "application/json; charset=utf-8");
