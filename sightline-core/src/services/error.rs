use thiserror::Error;

/// Failures reported by an external collaborator.
///
/// Endpoints are recorded without their query string so credentials passed
/// as query parameters never reach logs or terminal output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request did not complete within the configured timeout.
    #[error("request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout {
        /// Endpoint that was called.
        endpoint: String,
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("{endpoint} returned HTTP {status}: {message}")]
    Http {
        /// Endpoint that was called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Transport-level description.
        message: String,
    },
    /// The request failed before a response was received.
    #[error("network error calling {endpoint}: {message}")]
    Network {
        /// Endpoint that was called.
        endpoint: String,
        /// Transport-level description.
        message: String,
    },
    /// The service answered but reported a non-success status in its payload.
    #[error("service reported {code}: {message}")]
    Status {
        /// Service status code, e.g. `ZERO_RESULTS`.
        code: String,
        /// Optional human-readable detail.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse service response: {message}")]
    Parse {
        /// Decoder description.
        message: String,
    },
}
