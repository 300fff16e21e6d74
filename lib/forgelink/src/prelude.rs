//! Prelude module for convenient imports.
//!
//! ```ignore
//! use forgelink::prelude::*;
//! ```

pub use crate::{
    AsBinary, AsJson, AsStatusOnly, AsStreamHandle, AsText, CallerOwned, CancellationToken,
    ClientConfig, Download, Empty, Error, Field, ForgeClient, Form, HttpTransport, HyperClient,
    Method, Part, QueryBuilder, Request, RequestBuilder, Result, StatusOutcome, api_enum,
    path_segment,
};

// Re-export serde traits for request and response types
pub use serde::{Deserialize, Serialize};
