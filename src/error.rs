//! Error types shared by all scanners and builders.

use crate::sdp::Sdp;
use thiserror::Error;

/// Errors raised by the scanners and phylogeny builders.
#[derive(Error, Debug)]
pub enum HaploError {
    /// Reading from an underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A channel-backed stream lost its producer before all announced items were delivered
    #[error("stream closed after {delivered} of {expected} items")]
    StreamClosed { delivered: usize, expected: usize },

    /// The caller violated an input contract (stream lengths, directions, interval ordering)
    #[error("precondition violated: {message}")]
    Precondition { message: String },

    /// Two SDPs in the requested interval cannot be placed on one perfect phylogeny
    #[error("incompatible SDPs {first} and {second}: no perfect phylogeny exists")]
    IncompatibleSdps { first: Sdp, second: Sdp },
}

/// Type alias for results using [`HaploError`]
pub type Result<T> = std::result::Result<T, HaploError>;

impl HaploError {
    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create an incompatibility error for two offending SDPs
    pub fn incompatible(first: &Sdp, second: &Sdp) -> Self {
        Self::IncompatibleSdps {
            first: first.clone(),
            second: second.clone(),
        }
    }

    /// Whether this error means the requested interval has no perfect phylogeny. Callers may
    /// shrink the interval and retry in that case.
    pub fn is_incompatibility(&self) -> bool {
        matches!(self, Self::IncompatibleSdps { .. })
    }
}
