//! Error types for the mblookup-query crate.
//!
//! Display strings are stable and lowercase so callers can match on them
//! in logs. Query text never appears in error messages.

/// Errors raised while paging through catalog search results.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// An index at or past the end of the result set was requested.
    #[error("index {index} out of range for {count} results")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The total number of results.
        count: usize,
    },

    /// A round trip to the remote service failed (transport or parse).
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Invalid query configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for mblookup-query results.
pub type Result<T> = std::result::Result<T, QueryError>;
