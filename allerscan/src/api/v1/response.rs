//! # V1 API Response Envelope & Error Contract
//!
//! Every v1 endpoint returns an [`ApiResponse<T>`] envelope:
//!
//! ```json
//! {
//!   "data": { ... },                                     // present on success
//!   "error": { "code": "invalid_request", "message": "..." }  // present on error
//! }
//! ```
//!
//! Error messages are always safe for end users. OCR provider bodies and
//! per-strategy diagnostics are logged, never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AllerscanError;

/// Machine-readable error code included in every error response.
///
/// Serialized as a snake_case string on the wire (e.g. `"invalid_request"`).
/// Each variant maps to a fixed HTTP status code via [`ErrorCode::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Missing image, empty allergen list or malformed upload. HTTP 400.
    InvalidRequest,
    /// A bearer key is required and was missing or wrong. HTTP 401.
    Unauthorized,
    /// The image was too large for the configured limit. HTTP 413.
    PayloadTooLarge,
    /// An unexpected server-side error occurred. HTTP 500.
    InternalError,
    /// Every OCR strategy failed for this image. HTTP 502.
    ExtractionFailed,
    /// No usable OCR strategy is configured on this server. HTTP 503.
    NotConfigured,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ExtractionFailed => StatusCode::BAD_GATEWAY,
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::PayloadTooLarge => write!(f, "payload_too_large"),
            Self::InternalError => write!(f, "internal_error"),
            Self::ExtractionFailed => write!(f, "extraction_failed"),
            Self::NotConfigured => write!(f, "not_configured"),
        }
    }
}

/// Structured error payload within the API envelope.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    /// Machine-readable error classification.
    pub code: ErrorCode,
    /// Human-readable description safe to display to end users.
    pub message: String,
}

/// Canonical v1 API response envelope.
///
/// On success `data` is present and `error` is absent; on error the reverse.
/// The HTTP status is derived from the error code, or 200 on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// HTTP status to use in the response. Not serialized on the wire.
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response with data (HTTP 200).
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Error response. HTTP status is derived from the [`ErrorCode`].
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(_) => {
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<AllerscanError> for ApiResponse<T> {
    /// Convert an [`AllerscanError`] into a v1 [`ApiResponse`].
    ///
    /// The client only ever sees [`AllerscanError::user_message`]; the full
    /// error, including every OCR diagnostic, is logged.
    fn from(err: AllerscanError) -> Self {
        let code = match &err {
            AllerscanError::InputValidation(_) => ErrorCode::InvalidRequest,
            AllerscanError::Extraction { diagnostics } => {
                tracing::warn!(
                    attempts = diagnostics.len(),
                    error = %err,
                    "Text extraction failed for request"
                );
                ErrorCode::ExtractionFailed
            }
            AllerscanError::Configuration(_) => {
                tracing::error!(error = %err, "Scan requested but OCR is not configured");
                ErrorCode::NotConfigured
            }
            AllerscanError::Json(_) | AllerscanError::Io(_) => {
                tracing::error!(error = %err, "Internal error mapped to v1 response");
                ErrorCode::InternalError
            }
        };

        ApiResponse::error(code, err.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::Diagnostic;

    #[test]
    fn success_response_serializes_without_error() {
        let resp = ApiResponse::success("hello");
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["data"], "hello");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn error_response_serializes_without_data() {
        let resp = ApiResponse::<()>::error(ErrorCode::InvalidRequest, "no image");
        let json = serde_json::to_value(&resp).expect("serialize");
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["code"], "invalid_request");
        assert_eq!(json["error"]["message"], "no image");
    }

    #[test]
    fn error_code_status_mapping() {
        assert_eq!(ErrorCode::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ErrorCode::PayloadTooLarge.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ErrorCode::InternalError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ErrorCode::ExtractionFailed.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ErrorCode::NotConfigured.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn error_code_serializes_snake_case() {
        let json = serde_json::to_value(&ErrorCode::ExtractionFailed).expect("serialize");
        assert_eq!(json, "extraction_failed");
        assert_eq!(ErrorCode::NotConfigured.to_string(), "not_configured");
    }

    #[test]
    fn extraction_error_does_not_leak_diagnostics() {
        let err = AllerscanError::Extraction {
            diagnostics: vec![Diagnostic::new(
                "ocrspace",
                "HTTP 403: API error: The API key is invalid",
            )],
        };
        let resp: ApiResponse<()> = err.into();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["error"]["code"], "extraction_failed");
        let message = json["error"]["message"].as_str().unwrap();
        assert!(!message.contains("API key"));
        assert!(message.contains("1 OCR attempt(s) failed"));
    }

    #[test]
    fn validation_error_keeps_message() {
        let resp: ApiResponse<()> =
            AllerscanError::InputValidation("Provide an image".to_string()).into();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.error.unwrap().message, "Provide an image");
    }

    #[test]
    fn internal_error_is_generic() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "/var/lib/allerscan: disk full");
        let resp: ApiResponse<()> = AllerscanError::Io(io).into();
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["error"]["code"], "internal_error");
        assert_eq!(json["error"]["message"], "An internal error occurred");
        assert!(!json.to_string().contains("disk full"));
    }
}
