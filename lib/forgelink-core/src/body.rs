//! Body serialization utilities.

use bytes::Bytes;

use crate::Result;

/// Content type for request and response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// Plain text content type (`text/plain`).
    PlainText,
    /// Binary content type (`application/octet-stream`).
    OctetStream,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::PlainText => "text/plain",
            Self::OctetStream => "application/octet-stream",
        }
    }

    /// Returns `true` if a `Content-Type` header value denotes JSON.
    ///
    /// Parameters such as `charset` are ignored, and structured syntax
    /// suffixes (`application/problem+json`) count as JSON.
    #[must_use]
    pub fn is_json(header_value: &str) -> bool {
        let media_type = header_value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        media_type == Self::Json.as_str()
            || (media_type.starts_with("application/") && media_type.ends_with("+json"))
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Example
///
/// ```
/// use forgelink_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct CreateLabel { name: String }
///
/// let label = CreateLabel { name: "bug".to_string() };
/// let bytes = to_json(&label).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"bug"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Failures are reported as [`crate::Error::Interpret`] carrying the path of
/// the field that failed (e.g. `owner.login`).
///
/// # Example
///
/// ```
/// use forgelink_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { login: String }
///
/// let user: User = from_json(br#"{"login":"alice"}"#).expect("deserialize");
/// assert_eq!(user, User { login: "alice".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

/// Best-effort extraction of the `message` field of a JSON body.
///
/// Never fails: malformed JSON, a non-object body, or a missing, empty or
/// non-string `message` all yield `None`.
#[must_use]
pub fn extract_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn content_type_as_str() {
        check!(ContentType::Json.as_str() == "application/json");
        check!(ContentType::PlainText.as_str() == "text/plain");
        check!(ContentType::OctetStream.to_string() == "application/octet-stream");
    }

    #[test]
    fn json_content_type_detection() {
        check!(ContentType::is_json("application/json"));
        check!(ContentType::is_json("application/json; charset=utf-8"));
        check!(ContentType::is_json("Application/JSON"));
        check!(ContentType::is_json("application/problem+json"));
        check!(!ContentType::is_json("text/plain"));
        check!(!ContentType::is_json("text/html; charset=utf-8"));
        check!(!ContentType::is_json(""));
    }

    #[test]
    fn to_json_skips_absent_fields() {
        #[derive(serde::Serialize)]
        struct EditRepo {
            name: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            description: Option<String>,
        }

        let edit = EditRepo {
            name: "forgelink".to_string(),
            description: None,
        };

        let bytes = to_json(&edit).expect("serialize");
        check!(bytes.as_ref() == br#"{"name":"forgelink"}"#);
    }

    #[test]
    fn from_json_deserialize() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct User {
            login: String,
            id: u64,
        }

        let user: User = from_json(br#"{"login":"alice","id":7}"#).expect("deserialize");
        check!(
            user == User {
                login: "alice".to_string(),
                id: 7,
            }
        );
    }

    #[test]
    fn from_json_syntax_error_is_interpret_failure() {
        #[derive(Debug, serde::Deserialize)]
        struct User {
            #[allow(dead_code)]
            login: String,
        }

        let_assert!(Err(err) = from_json::<User>(b"not json"));
        check!(err.is_interpret_failure());
    }

    #[test]
    fn from_json_missing_field_error_with_path() {
        #[derive(Debug, serde::Deserialize)]
        struct Owner {
            #[allow(dead_code)]
            login: String,
        }

        #[derive(Debug, serde::Deserialize)]
        struct Repository {
            #[allow(dead_code)]
            owner: Owner,
        }

        let_assert!(Err(err) = from_json::<Repository>(br#"{"owner":{}}"#));
        let msg = err.to_string();
        check!(msg.contains("owner"), "expected path 'owner' in error: {msg}");
        check!(msg.contains("login"), "expected field 'login' in error: {msg}");
    }

    #[test]
    fn extract_message_present() {
        check!(extract_message(br#"{"message":"not found"}"#) == Some("not found".to_string()));
        check!(
            extract_message(br#"{"message":"token is required","url":"https://forge.example/api/swagger"}"#)
                == Some("token is required".to_string())
        );
    }

    #[test]
    fn extract_message_never_fails() {
        check!(extract_message(b"") == None);
        check!(extract_message(b"<html>oops</html>") == None);
        check!(extract_message(br#"{"message":42}"#) == None);
        check!(extract_message(br#"{"message":""}"#) == None);
        check!(extract_message(br#"{"errors":["bad"]}"#) == None);
        check!(extract_message(br#"["message"]"#) == None);
        check!(extract_message(br#"{"message":"trunc"#) == None);
    }
}
