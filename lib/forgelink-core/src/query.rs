//! Request path and query construction.
//!
//! ```
//! use forgelink_core::QueryBuilder;
//!
//! let path = QueryBuilder::new("repos/search")
//!     .param("page", None::<u32>)
//!     .param("limit", Some(50))
//!     .build();
//! assert_eq!(path, "repos/search?limit=50");
//! ```

use std::fmt::{Display, Write as _};

use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped inside a single path segment.
///
/// Unreserved characters (`A-Z a-z 0-9 - . _ ~`) pass through; anything that
/// would change the meaning of the path (`/`, `?`, `#`, `%`, ...) is encoded.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'%');

/// Percent-encode a value for use as one path segment.
///
/// ```
/// use forgelink_core::path_segment;
///
/// assert_eq!(path_segment("docs/README.md"), "docs%2FREADME.md");
/// ```
#[must_use]
pub fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT_ENCODE_SET).to_string()
}

/// Render a timestamp the way date query parameters expect it:
/// UTC, whole seconds, `YYYY-MM-DDThh:mm:ssZ`.
#[must_use]
pub fn format_date_time(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Builds a request path followed by optional `name=value` parameters.
///
/// Parameters keep insertion order. Absent values contribute nothing; the
/// first present parameter is introduced by `?` and the rest by `&`. Values
/// are written as given; escaping beyond that is left to the transport.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    path: String,
    has_query: bool,
}

impl QueryBuilder {
    /// Start from a base path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            has_query: false,
        }
    }

    /// Append a parameter if `value` is present.
    #[must_use]
    pub fn param<V: Display>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            let separator = if self.has_query { '&' } else { '?' };
            // Writing into a String cannot fail.
            let _ = write!(self.path, "{separator}{name}={value}");
            self.has_query = true;
        }
        self
    }

    /// Append a date parameter, rendered by [`format_date_time`].
    #[must_use]
    pub fn date(self, name: &str, value: Option<&DateTime<Utc>>) -> Self {
        self.param(name, value.map(format_date_time))
    }

    /// Finish the path.
    #[must_use]
    pub fn build(self) -> String {
        self.path
    }
}
