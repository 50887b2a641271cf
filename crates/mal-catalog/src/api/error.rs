//! Error types for the catalog client.

use thiserror::Error;

/// Failure modes of a catalog request.
///
/// `InvalidNumber`, `Rejected` and `Transport` are expected conditions:
/// they are logged at the point of detection and returned for the caller
/// to translate into a user-facing message. `Decode` means the service
/// answered 200 with a shape the record types cannot hold, which is a bug
/// on one side or the other and intentionally carries no logging policy.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A numeric-typed argument contained something other than digits.
    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber {
        field: &'static str,
        value: String,
    },

    /// The service answered with a non-200 status.
    #[error("catalog request rejected with status {status}: {message}")]
    Rejected {
        status: u16,
        message: String,
        url: String,
    },

    /// The service could not be reached or the body could not be read.
    #[error("failed to reach the catalog service")]
    Transport(#[source] reqwest::Error),

    /// A 200 response did not match the expected record shape.
    #[error("unexpected catalog response shape")]
    Decode(#[source] serde_json::Error),
}

impl CatalogError {
    /// Whether this is an expected failure (validation or remote), as
    /// opposed to a malformed-success bug.
    pub fn is_expected(&self) -> bool {
        !matches!(self, CatalogError::Decode(_))
    }
}
