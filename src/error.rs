//! Hub error types and their structured response shape.
//!
//! [`HubError`] is the central error type of the hub. No variant is fatal:
//! the REST facade renders every error as a `{status:"error", message}`
//! body, and the real-time channel sends the same shape as an `error`
//! event to the originating connection.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured error body shared by REST and real-time replies.
///
/// ```json
/// {"status": "error", "message": "invalid value for servo_angle: ..."}
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `"error"`.
    #[schema(value_type = String, example = "error")]
    pub status: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// Recoverable error raised while handling an inbound event or request.
///
/// # Error Codes
///
/// | Code | Variant            |
/// |------|--------------------|
/// | 1001 | `Validation`       |
/// | 1002 | `MalformedPayload` |
/// | 1003 | `UnknownEvent`     |
/// | 3000 | `Internal`         |
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// An actuator command carried a value that does not fit the actuator.
    #[error("invalid value for {actuator}: {reason}")]
    Validation {
        /// Actuator the command targeted.
        actuator: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An inbound frame could not be decoded at all.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// An inbound frame named an event the hub does not handle.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Internal failure, for example an event that could not be encoded.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HubError {
    /// Shorthand for a [`HubError::Validation`].
    #[must_use]
    pub fn validation(actuator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            actuator: actuator.into(),
            reason: reason.into(),
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation { .. } => 1001,
            Self::MalformedPayload(_) => 1002,
            Self::UnknownEvent(_) => 1003,
            Self::Internal(_) => 3000,
        }
    }

    /// Converts the error into its structured body.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            status: "error",
            message: self.to_string(),
        }
    }
}

impl IntoResponse for HubError {
    /// Errors are reported in the body; the HTTP status is always 200.
    fn into_response(self) -> Response {
        tracing::warn!(code = self.error_code(), error = %self, "request rejected");
        (StatusCode::OK, axum::Json(self.to_response())).into_response()
    }
}
