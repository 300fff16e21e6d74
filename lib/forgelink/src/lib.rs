//! Async client for forge (source-control service) REST APIs.
//!
//! Requests are built against the API base URL, sent through a pooled
//! hyper/rustls transport, and interpreted into the result each endpoint
//! declares: a JSON value, text, bytes, a status outcome, or a download the
//! caller streams and releases.
//!
//! # Example
//!
//! ```ignore
//! use forgelink::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct User {
//!     id: u64,
//!     login: String,
//! }
//!
//! let client = ForgeClient::builder("https://forge.example/api/v1")
//!     .token("my-access-token")
//!     .build()?;
//!
//! let me: User = client.json(client.get("user")?.build()).await?;
//!
//! let starred = client
//!     .exists(client.get("user/starred/alice/forgelink")?.build())
//!     .await?;
//!
//! let mut archive = client
//!     .download(client.get("repos/alice/forgelink/archive/main.zip")?.build())
//!     .await?;
//! let bytes = archive.payload_mut().expect("not released").bytes().await?;
//! archive.release();
//! ```

mod client;
mod config;
mod connector;
mod forge_client;
pub mod middleware;
pub mod prelude;

pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_USER_AGENT};
pub use forge_client::{ForgeClient, ForgeClientBuilder};

// Re-export tower for middleware composition
pub use tower;

pub use forgelink_core::{
    AUTHORIZATION, AsBinary, AsJson, AsStatusOnly, AsStreamHandle, AsText, CONTENT_TYPE, CallerOwned,
    CancellationToken, ContentType, DecodeError, Decoding, DecodingKind, Download, Empty, Error,
    Field, Form, HttpTransport, Method, Part, QueryBuilder, ReleaseHook, Request, RequestBuilder,
    Response, Result, SUDO, StatusOutcome, StreamingBody, StreamingResponse, UnknownVariant,
    api_enum, content_disposition_file_name, extract_message, format_date_time, from_json,
    interpret, path_segment, to_json,
};
