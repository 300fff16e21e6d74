//! HTTP transport trait.
//!
//! An [`HttpTransport`] turns a [`Request`] into a pending exchange: a future
//! resolving to a [`StreamingResponse`] whose body is still unread. What the
//! response means is decided later by [`crate::interpret`].
//!
//! Implement it directly for custom transports or in-memory test doubles.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Request, Result, StreamingResponse};

/// Core HTTP transport trait.
///
/// Implementations own connection pooling and the transport-wide timeout.
/// They must not retry, and must not look at the status code: a 404 or 500
/// is a successful exchange at this level.
pub trait HttpTransport: Send + Sync {
    /// Send a request and resolve once the response head has arrived.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    /// - Invalid request
    fn send(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<StreamingResponse>> + Send;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn send(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<StreamingResponse>> + Send {
        (**self).send(request)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn send(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<StreamingResponse>> + Send {
        (**self).send(request)
    }
}
