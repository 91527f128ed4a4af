//! Error types for adapters.

use esmon_engine::SourceError;
use thiserror::Error;

/// Errors that can occur when reading from Elasticsearch or the host.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The path is outside the read-only allow-list; nothing was sent.
    #[error("Endpoint not permitted in read-only mode: {0}")]
    Forbidden(String),

    /// Not available on this platform.
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// Reading a local counter file failed.
    #[error("I/O error: {0}")]
    Io(String),
}

#[cfg(feature = "elasticsearch")]
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else if err.is_connect() {
            AdapterError::Connection(err.to_string())
        } else if err.is_decode() {
            AdapterError::Parse(err.to_string())
        } else {
            AdapterError::Http(err.to_string())
        }
    }
}

impl From<AdapterError> for SourceError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Timeout => SourceError::Unavailable("request timed out".to_string()),
            AdapterError::Auth(msg) => SourceError::Denied(msg),
            AdapterError::Forbidden(path) => {
                SourceError::Denied(format!("{path} is not a read-only endpoint"))
            }
            AdapterError::Parse(msg) => SourceError::Invalid(msg),
            AdapterError::Unsupported(msg) => SourceError::Unsupported(msg),
            AdapterError::Http(msg) | AdapterError::Connection(msg) | AdapterError::Io(msg) => {
                SourceError::Unavailable(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_errors_map_to_source_errors() {
        assert_eq!(
            SourceError::from(AdapterError::Auth("bad password".to_string())),
            SourceError::Denied("bad password".to_string())
        );
        assert!(matches!(
            SourceError::from(AdapterError::Parse("eof".to_string())),
            SourceError::Invalid(_)
        ));
        assert!(matches!(
            SourceError::from(AdapterError::Connection("refused".to_string())),
            SourceError::Unavailable(_)
        ));
        let forbidden = SourceError::from(AdapterError::Forbidden("/_bulk".to_string()));
        assert!(forbidden.to_string().contains("/_bulk"));
    }
}
