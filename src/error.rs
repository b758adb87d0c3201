//! Error types for the mblookup application.

use mblookup_query::QueryError;

/// Top-level error type for catalog lookups.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Catalog query error.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Unrecognised command-line usage.
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_errors_display_unchanged() {
        let err = LookupError::from(QueryError::Fetch("HTTP error: 503".into()));
        assert_eq!(err.to_string(), "fetch failed: HTTP error: 503");
    }

    #[test]
    fn display_config() {
        let err = LookupError::Config("expected a table".into());
        assert_eq!(err.to_string(), "config error: expected a table");
    }

    #[test]
    fn io_error_converts() {
        let err: LookupError = std::io::Error::other("disk full").into();
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LookupError>();
    }
}
