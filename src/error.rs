use thiserror::Error;

/// Failures that are allowed to escape the client.
///
/// Requests themselves never produce one of these: the dispatcher reports
/// transport and HTTP failures as [`crate::ResponseEnvelope::Absent`].
/// Only setup problems and pagination integrity failures are raised.
#[derive(Debug, Error)]
pub enum HyperproofError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unable to read upload `{path}`: {source}")]
    Upload {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A page came back absent, or without its `data` array.
    #[error("no data returned from {operation}")]
    PaginationIntegrity { operation: String },

    #[error("{operation} exceeded the limit of {max_pages} pages")]
    PageLimitExceeded { operation: String, max_pages: usize },

    /// The server handed back the continuation token we just sent.
    #[error("{operation} returned the same continuation token twice")]
    PaginationStalled { operation: String },
}

pub type Result<T, E = HyperproofError> = std::result::Result<T, E>;
