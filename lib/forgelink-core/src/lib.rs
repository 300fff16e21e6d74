//! Core types and traits for the forgelink forge API client.
//!
//! This crate holds everything that does not depend on a concrete transport:
//! - [`Method`], [`Request`] and [`RequestBuilder`] - outgoing calls
//! - [`QueryBuilder`] - request paths with optional query parameters
//! - [`HttpTransport`] - the seam a transport implements
//! - [`StreamingResponse`] and [`Response`] - incoming responses
//! - [`interpret`] and the [`Decoding`] strategies - turning a response into
//!   the value an endpoint declares
//! - [`CallerOwned`] and [`Download`] - results that keep the response open
//! - [`StatusOutcome`] - status-only answers
//! - [`Error`] and [`Result`] - error handling
//! - [`Field`] and [`api_enum!`] - request body building blocks

mod body;
mod client;
mod decode;
mod error;
mod field;
mod method;
mod multipart;
mod owned;
pub mod prelude;
mod query;
mod request;
mod response;
mod status;

#[cfg(test)]
mod testing;

pub use body::{ContentType, extract_message, from_json, to_json};
pub use client::HttpTransport;
pub use decode::{
    AsBinary, AsJson, AsStatusOnly, AsStreamHandle, AsText, Decoding, DecodingKind, Empty, interpret,
};
pub use error::{DecodeError, Error, Result};
pub use field::{Field, UnknownVariant};
pub use method::Method;
pub use multipart::{Form, Part};
pub use owned::{CallerOwned, Download, content_disposition_file_name};
pub use query::{QueryBuilder, format_date_time, path_segment};
pub use request::{AUTHORIZATION, CONTENT_TYPE, Request, RequestBuilder, SUDO};
pub use response::{ReleaseHook, Response, StreamingBody, StreamingResponse};
pub use status::StatusOutcome;

// Used by the code `api_enum!` expands to.
#[doc(hidden)]
pub use serde;

pub use tokio_util::sync::CancellationToken;
