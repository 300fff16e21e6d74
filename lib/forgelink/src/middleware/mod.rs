//! Tower middleware layers for the forgelink transport.
//!
//! Layers operate on [`Request`](crate::Request) and resolve to a
//! [`StreamingResponse`](crate::StreamingResponse), so they see the response
//! head but never its body.
//!
//! - [`BearerAuthLayer`] - default `Authorization: Bearer <token>` header
//! - [`LoggingLayer`] - logs requests and response heads using `tracing`
//!
//! ```ignore
//! use forgelink::HyperClient;
//! use forgelink::middleware::BearerAuthLayer;
//!
//! let transport = HyperClient::builder()
//!     .layer(BearerAuthLayer::new("token"))
//!     .with_logging()
//!     .build();
//! ```

mod bearer_auth;
mod logging;

pub use bearer_auth::{BearerAuth, BearerAuthLayer};
pub use logging::{LogLevel, Logging, LoggingLayer};

pub use tower::{Layer, ServiceBuilder};
