//! Error types for remote calls and session operations

use fabsheet_core::ValidationIssue;
use thiserror::Error;

/// Result type alias using [`ClientError`].
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to the order service or mutating a
/// session.
///
/// Remote failures collapse to a single displayable message; the session's
/// in-memory state is left untouched so the user can retry. Business-rule
/// violations ([`ClientError::Order`]) and validation failures are raised
/// before any network call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A session method that needs a snapshot ran before a successful load.
    #[error("No order loaded in this session")]
    NotLoaded,

    /// The service answered with a non-success status. `message` carries the
    /// `message` field of the error body when present, the status text
    /// otherwise.
    #[error("Service error {status}: {message}")]
    Service { status: u16, message: String },

    /// The request never completed: connect, timeout or body failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered 2xx with a body that does not decode.
    #[error("Malformed service response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A data-layer rule was violated before any request was made.
    #[error(transparent)]
    Order(#[from] fabsheet_core::Error),

    /// Save blocked by validation issues; nothing was sent.
    #[error("Validation failed with {} issue(s)", .0.len())]
    Validation(Vec<ValidationIssue>),
}

impl ClientError {
    /// The issues attached to a validation failure.
    pub fn validation_issues(&self) -> Option<&[ValidationIssue]> {
        match self {
            ClientError::Validation(issues) => Some(issues),
            _ => None,
        }
    }
}
