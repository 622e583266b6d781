//! Error types shared by the fetch pipeline and reconciliation.

use std::fmt;

use thiserror::Error;

use crate::core::decode_error::DecodeError;
use crate::core::ids::ProfessorId;

/// Failure of the transport itself; never retried by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent or no response arrived.
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    /// The response body could not be read as JSON.
    #[error("unreadable response body from {url}: {message}")]
    Body { url: String, message: String },
}

impl TransportError {
    pub fn url(&self) -> &str {
        match self {
            Self::Request { url, .. } | Self::Status { url, .. } | Self::Body { url, .. } => url,
        }
    }
}

/// Outcome classification of a fetch-and-decode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl FetchError {
    /// Short message for an inline error view.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) => "Could not reach the server. Please try again.",
            Self::Decode(_) => "The server sent data in an unexpected format.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Attach,
    Detach,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Attach => f.write_str("attach"),
            Direction::Detach => f.write_str("detach"),
        }
    }
}

/// One attach/detach call that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{direction} professor {professor} failed: {cause}")]
pub struct ReconciliationError {
    pub professor: ProfessorId,
    pub direction: Direction,
    pub cause: TransportError,
}
