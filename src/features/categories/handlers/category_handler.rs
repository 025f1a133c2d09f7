use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::features::categories::services::CategoryService;
use crate::shared::locale::Locale;
use crate::shared::types::ApiResponse;

/// Public category tree for one locale
///
/// Returns the cached, locale-resolved tree of active categories, three
/// levels deep. Unsupported locale values fall back to the default locale.
#[utoipa::path(
    get,
    path = "/{locale}/categories",
    params(
        ("locale" = String, Path, description = "Language code (en-MY, ms-MY, zh-CN)")
    ),
    responses(
        (status = 200, description = "Materialized category tree", body = ApiResponse<serde_json::Value>),
    ),
    tag = "categories"
)]
pub async fn list_category_tree(
    State(service): State<Arc<CategoryService>>,
    Path(locale): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let locale = Locale::from_path(&locale);
    let tree = service.tree(locale).await?;
    Ok(Json(ApiResponse::success(Some(tree), None)))
}
