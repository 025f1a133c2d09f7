use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Public routes: the locale-keyed, cached category tree
pub fn public_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/{locale}/categories",
            get(handlers::list_category_tree),
        )
        .with_state(service)
}

/// Admin routes; the admin auth middleware is layered on by the caller
pub fn admin_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/admin/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/admin/categories/{id}",
            put(handlers::update_category)
                .get(handlers::get_category)
                .delete(handlers::delete_category),
        )
        .with_state(service)
}
