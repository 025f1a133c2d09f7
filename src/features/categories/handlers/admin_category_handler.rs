use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::core::middleware::AdminPrincipal;
use crate::features::categories::dtos::{CategoryAdminDto, CategoryDetailDto, CreateCategoryDto, UpdateCategoryDto};
use crate::features::categories::services::CategoryService;
use crate::shared::types::ApiResponse;

/// List all categories (admin)
///
/// Returns every category regardless of active flag, with translations and
/// the breadcrumb ancestor path, ordered by sort order then id.
#[utoipa::path(
    get,
    path = "/admin/categories",
    responses(
        (status = 200, description = "All categories", body = ApiResponse<Vec<CategoryAdminDto>>),
        (status = 401, description = "Missing or invalid admin token")
    ),
    security(("bearer_auth" = [])),
    tag = "admin-categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryAdminDto>>>> {
    let categories = service.list_admin().await?;
    Ok(Json(ApiResponse::success(Some(categories), None)))
}

/// Get one category (admin)
#[utoipa::path(
    get,
    path = "/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category with parent and children", body = ApiResponse<CategoryDetailDto>),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin-categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CategoryDetailDto>>> {
    let category = service.get_admin(id).await?;
    Ok(Json(ApiResponse::success(Some(category), None)))
}

/// Create a category (admin)
#[utoipa::path(
    post,
    path = "/admin/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryDetailDto>),
        (status = 422, description = "Validation error with field-keyed messages")
    ),
    security(("bearer_auth" = [])),
    tag = "admin-categories"
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    principal: AdminPrincipal,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDetailDto>>)> {
    dto.validate().map_err(|e| AppError::validation(&e))?;

    tracing::info!("Category create requested by {}", principal.subject);
    let category = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created".to_string()),
        )),
    ))
}

/// Update a category (admin)
///
/// Partial update: any subset of {slug, parent_id, image, sort_order,
/// is_active, translations}. Translation entries are upserts keyed by
/// language code.
#[utoipa::path(
    put,
    path = "/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryDetailDto>),
        (status = 404, description = "Category not found"),
        (status = 422, description = "Validation error with field-keyed messages")
    ),
    security(("bearer_auth" = [])),
    tag = "admin-categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    principal: AdminPrincipal,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryDetailDto>>> {
    dto.validate().map_err(|e| AppError::validation(&e))?;

    tracing::info!("Category {} update requested by {}", id, principal.subject);
    let category = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(category),
        Some("Category updated".to_string()),
    )))
}

/// Delete a category (admin)
///
/// Cascade: descendants and all affected translations are removed by the
/// storage layer. Deleting an already-deleted category is a 404.
#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin-categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    principal: AdminPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    tracing::info!("Category {} delete requested by {}", id, principal.subject);
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Category deleted".to_string()),
    )))
}
