//! Error types for trellis-api.

use thiserror::Error;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or protocol failure before a response arrived.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the endpoint.
    #[error("API request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The platform answered 200 but reported GraphQL errors.
    #[error("API error: {0}")]
    Graph(String),

    /// A 200 response without the data the operation requires.
    #[error("malformed API response: missing data")]
    MissingData,
}
