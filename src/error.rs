//! # Error Handling
//!
//! Application-level error type and its mapping to HTTP responses.
//!
//! ## Error Categories:
//! - **BadRequest**: Malformed request, e.g. a broken multipart body (400)
//! - **ValidationError**: A config update failed validation (400)
//! - **PayloadTooLarge**: Upload exceeded `audio.max_upload_bytes` (413)
//! - **UnsupportedAudio**: The audio could not be identified or its header is
//!   corrupt (415). The specific [`ParseError`] kind is kept in the body and logs.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;
use tracing::warn;

use crate::audio::ParseError;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),

    ValidationError(String),

    /// Upload size limit in bytes that was exceeded
    PayloadTooLarge(usize),

    UnsupportedAudio(ParseError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::PayloadTooLarge(limit) => {
                write!(f, "Payload too large: limit is {} bytes", limit)
            }
            AppError::UnsupportedAudio(err) => write!(f, "Unsupported or corrupted audio: {}", err),
        }
    }
}

impl AppError {
    fn error_type(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::ValidationError(_) => "validation_error",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::UnsupportedAudio(_) => "unsupported_audio",
        }
    }
}

/// JSON error body:
/// ```json
/// {
///   "error": {
///     "type": "unsupported_audio",
///     "kind": "truncated_chunk",
///     "message": "Unsupported or corrupted audio: chunk \"data\" ...",
///     "timestamp": "2025-01-01T12:00:00Z"
///   }
/// }
/// ```
/// `kind` is only present for audio errors.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedAudio(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let kind = match self {
            AppError::UnsupportedAudio(err) => {
                warn!(kind = err.kind(), error = %err, "Rejected audio");
                Some(err.kind())
            }
            _ => None,
        };

        let mut body = json!({
            "type": self.error_type(),
            "message": self.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        if let Some(kind) = kind {
            body["kind"] = json!(kind);
        }

        HttpResponse::build(self.status_code()).json(json!({ "error": body }))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON parsing error: {}", err))
    }
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        AppError::UnsupportedAudio(err)
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        AppError::BadRequest(format!("Multipart error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
