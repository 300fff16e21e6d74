//! Prelude module for convenient imports.
//!
//! ```ignore
//! use forgelink_core::prelude::*;
//! ```

pub use crate::{
    AsBinary, AsJson, AsStatusOnly, AsStreamHandle, AsText, CallerOwned, CancellationToken,
    Decoding, Download, Empty, Error, Field, Form, HttpTransport, Method, Part, QueryBuilder,
    Request, RequestBuilder, Response, Result, StatusOutcome, StreamingResponse, interpret,
};
