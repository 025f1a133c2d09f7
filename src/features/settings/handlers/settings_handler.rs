use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::core::middleware::AdminPrincipal;
use crate::features::settings::dtos::{SettingResponseDto, UpdateSettingsDto};
use crate::features::settings::services::SettingsService;
use crate::shared::types::ApiResponse;

/// Public settings map
///
/// Returns the cached flat `{key: value}` map.
#[utoipa::path(
    get,
    path = "/settings",
    responses(
        (status = 200, description = "Flat settings map", body = ApiResponse<serde_json::Value>),
    ),
    tag = "settings"
)]
pub async fn get_settings(
    State(service): State<Arc<SettingsService>>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let map = service.map().await?;
    Ok(Json(ApiResponse::success(Some(map), None)))
}

/// List all settings (admin)
#[utoipa::path(
    get,
    path = "/admin/settings",
    responses(
        (status = 200, description = "All setting rows", body = ApiResponse<Vec<SettingResponseDto>>),
        (status = 401, description = "Missing or invalid admin token")
    ),
    security(("bearer_auth" = [])),
    tag = "admin-settings"
)]
pub async fn list_settings(
    State(service): State<Arc<SettingsService>>,
) -> Result<Json<ApiResponse<Vec<SettingResponseDto>>>> {
    let settings = service.list_admin().await?;
    Ok(Json(ApiResponse::success(Some(settings), None)))
}

/// Bulk upsert settings (admin)
///
/// Evicts the cached public map before returning.
#[utoipa::path(
    put,
    path = "/admin/settings",
    request_body = UpdateSettingsDto,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<Vec<SettingResponseDto>>),
        (status = 422, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "admin-settings"
)]
pub async fn update_settings(
    State(service): State<Arc<SettingsService>>,
    principal: AdminPrincipal,
    AppJson(dto): AppJson<UpdateSettingsDto>,
) -> Result<Json<ApiResponse<Vec<SettingResponseDto>>>> {
    dto.validate().map_err(|e| AppError::validation(&e))?;

    tracing::info!("Settings update requested by {}", principal.subject);
    let settings = service.upsert(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(settings),
        Some("Settings updated".to_string()),
    )))
}
