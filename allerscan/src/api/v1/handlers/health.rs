use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;

/// Health data returned inside the v1 envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub ocr: OcrStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OcrStatus {
    /// `"ready"` when at least one strategy is usable, otherwise `"unavailable"`.
    pub status: String,
    /// Strategy names in the order they are attempted.
    pub strategies: Vec<String>,
    pub timeout_secs: u64,
}

/// `GET /api/v1/health`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let ocr = OcrStatus {
        status: if state.scanner.is_available() {
            "ready"
        } else {
            "unavailable"
        }
        .to_string(),
        strategies: state
            .scanner
            .strategy_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        timeout_secs: state.config.ocr.timeout_secs,
    };

    ApiResponse::success(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ocr,
    })
}
