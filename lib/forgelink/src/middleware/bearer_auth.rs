//! Bearer token authentication middleware.
//!
//! The token is a default: a request that already carries an
//! `Authorization` header (per-call basic credentials, for instance) is
//! passed through untouched.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use tower::{Layer, Service};

use crate::{AUTHORIZATION, Error, Request, Result, StreamingResponse};

/// Layer that adds bearer token authentication to requests.
#[derive(Clone)]
pub struct BearerAuthLayer {
    token: Arc<str>,
}

impl std::fmt::Debug for BearerAuthLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuthLayer")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl BearerAuthLayer {
    /// Create a new bearer auth layer with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }
}

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuth {
            inner,
            token: Arc::clone(&self.token),
        }
    }
}

/// Service that adds bearer token authentication to requests.
#[derive(Clone)]
pub struct BearerAuth<S> {
    inner: S,
    token: Arc<str>,
}

impl<S> BearerAuth<S> {
    /// Create a new bearer auth service wrapping the given service.
    pub fn new(inner: S, token: impl Into<String>) -> Self {
        Self {
            inner,
            token: Arc::from(token.into()),
        }
    }

    fn authorize(&self, request: &mut Request<Bytes>) {
        if !request.has_header(AUTHORIZATION) {
            request
                .headers_mut()
                .insert(AUTHORIZATION.to_string(), format!("Bearer {}", self.token));
        }
    }
}

impl<S> Service<Request<Bytes>> for BearerAuth<S>
where
    S: Service<Request<Bytes>, Response = StreamingResponse, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = StreamingResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Bytes>) -> Self::Future {
        self.authorize(&mut request);

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(request).await })
    }
}
