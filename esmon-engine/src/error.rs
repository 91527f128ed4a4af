//! Errors raised by metric sources.

use std::time::Duration;

use thiserror::Error;

/// A failed read from a counter or cluster source.
///
/// These are transient: the failing section is marked with the error for
/// the cycle and the next tick tries again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// The source could not be reached or read.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The source did not answer before the deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The source was refused, e.g. bad credentials.
    #[error("access denied: {0}")]
    Denied(String),

    /// The source answered with something that could not be understood.
    #[error("invalid response: {0}")]
    Invalid(String),

    /// The platform does not expose this data.
    #[error("not supported on this platform: {0}")]
    Unsupported(String),
}
