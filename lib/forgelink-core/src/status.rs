//! Status-only outcomes.
//!
//! Several endpoints answer a yes/no question through the status code alone
//! ("is this user a collaborator?", "is this repository starred?"). Those
//! calls decode to a [`StatusOutcome`], and turning it into an answer is a
//! separate, explicit step: [`StatusOutcome::evaluate`].

use crate::{Error, Result};

/// The status code of a response and the message its body carried, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOutcome {
    /// HTTP status code.
    pub code: u16,
    /// `message` field of a JSON body, when there was one.
    pub message: Option<String>,
}

impl StatusOutcome {
    /// Creates a new outcome.
    #[must_use]
    pub fn new(code: u16, message: Option<String>) -> Self {
        Self { code, message }
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// Status is 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.code == 404
    }

    /// Turn the outcome into a presence answer.
    ///
    /// - 2xx: `true`
    /// - 404: `false`
    /// - anything else (1xx and 3xx included): [`Error::Response`] with the
    ///   body message, or `HTTP {code}` when there was none.
    pub fn evaluate(&self) -> Result<bool> {
        if self.is_success() {
            Ok(true)
        } else if self.is_not_found() {
            Ok(false)
        } else {
            let message = self
                .message
                .clone()
                .unwrap_or_else(|| format!("HTTP {}", self.code));
            Err(Error::response(self.code, message))
        }
    }
}
