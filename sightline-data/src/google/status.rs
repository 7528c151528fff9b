//! Error payload shared by the Google Cloud JSON APIs.

use serde::Deserialize;
use sightline_core::ServiceError;

/// A `google.rpc.Status` object as embedded in JSON responses.
#[derive(Debug, Default, Deserialize)]
pub struct RpcStatus {
    /// Numeric status code; `0` means OK.
    #[serde(default)]
    pub code: i64,
    /// Developer-facing message.
    #[serde(default)]
    pub message: String,
    /// Symbolic status, e.g. `INVALID_ARGUMENT`. Absent on Vision
    /// per-image errors.
    #[serde(default)]
    pub status: Option<String>,
}

impl RpcStatus {
    /// Convert into a [`ServiceError::Status`], preferring the symbolic code.
    pub fn into_service_error(self) -> ServiceError {
        ServiceError::Status {
            code: self.status.unwrap_or_else(|| self.code.to_string()),
            message: self.message,
        }
    }
}
