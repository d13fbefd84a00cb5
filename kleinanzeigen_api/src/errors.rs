//! Error types for the marketplace client.

/// Errors that can occur when fetching marketplace pages.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A URL could not be parsed or joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The request failed before a response arrived (network error, timeout)
    /// or the body could not be read.
    #[error("Request failed: {0}")]
    RequestFailed(String),
    /// The server returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
}
