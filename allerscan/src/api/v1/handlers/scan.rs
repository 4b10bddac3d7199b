use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use chrono::Utc;
use nanoid::nanoid;
use tracing::info;

use crate::api::state::AppState;
use crate::api::v1::dto::{ScanForm, ScanResponse};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};

fn parse_form_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn multipart_error<T: serde::Serialize>(e: MultipartError) -> ApiResponse<T> {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiResponse::error(ErrorCode::PayloadTooLarge, "Image is too large")
    } else {
        ApiResponse::error(
            ErrorCode::InvalidRequest,
            format!("Malformed upload: {}", e.body_text()),
        )
    }
}

/// `POST /api/v1/scan`
///
/// Runs OCR on the uploaded label photo and reports which of the listed
/// allergens appear in it. Nothing is stored.
#[utoipa::path(
    post,
    path = "/api/v1/scan",
    tag = "scan",
    operation_id = "scan.create",
    request_body(content = ScanForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Scan completed", body = ScanResponse),
        (status = 400, description = "Missing image or allergens", body = ApiError),
        (status = 401, description = "Missing or invalid API key", body = ApiError),
        (status = 413, description = "Image too large", body = ApiError),
        (status = 502, description = "No OCR strategy could read the image", body = ApiError),
        (status = 503, description = "OCR is not configured", body = ApiError),
    )
)]
pub async fn scan(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResponse<ScanResponse> {
    let max_image_bytes = state.config.server.max_image_bytes;
    let mut image: Option<Vec<u8>> = None;
    let mut allergens: Option<String> = None;
    let mut show_text = false;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return multipart_error(e),
        };
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" | "file" => {
                let bytes = match field.bytes().await {
                    Ok(b) => b,
                    Err(e) => return multipart_error(e),
                };

                if bytes.len() > max_image_bytes {
                    return ApiResponse::error(
                        ErrorCode::PayloadTooLarge,
                        format!(
                            "Image too large: {} bytes (max {} bytes)",
                            bytes.len(),
                            max_image_bytes
                        ),
                    );
                }

                image = Some(bytes.to_vec());
            }
            "allergens" => {
                allergens = match field.text().await {
                    Ok(t) => Some(t),
                    Err(e) => return multipart_error(e),
                };
            }
            "showText" | "show_text" => {
                let raw = match field.text().await {
                    Ok(t) => t,
                    Err(e) => return multipart_error(e),
                };
                match parse_form_bool(&raw) {
                    Some(value) => show_text = value,
                    None => {
                        return ApiResponse::error(
                            ErrorCode::InvalidRequest,
                            "showText must be one of true/false/1/0/yes/no/on/off",
                        );
                    }
                }
            }
            _ => {}
        }
    }

    let scan_id = nanoid!();
    let result = match state
        .scanner
        .scan(
            image.as_deref(),
            allergens.as_deref().unwrap_or_default(),
            show_text,
        )
        .await
    {
        Ok(result) => result,
        Err(e) => return e.into(),
    };

    info!(
        scan_id = %scan_id,
        detected = result.detected().len(),
        "Scan request completed"
    );

    ApiResponse::success(ScanResponse::new(scan_id, Utc::now(), result, show_text))
}
