//! Error types for the update-resolution engine.

use thiserror::Error;

/// Errors that can occur while talking to the delivery or storefront services.
///
/// Every variant is fatal to the current resolution step: no call is retried
/// and no partial result is produced. "Nothing to update" and "no compatible
/// architecture" are deliberately *not* errors; they surface as empty results.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProtocolError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status code.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// A required element or field was absent from the response.
    #[error("Missing required element: {0}")]
    MissingElement(&'static str),

    /// The response could not be decoded as the expected document shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
}
