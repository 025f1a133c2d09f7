use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::settings::handlers;
use crate::features::settings::services::SettingsService;

/// Public route: the cached settings map
pub fn public_routes(service: Arc<SettingsService>) -> Router {
    Router::new()
        .route("/settings", get(handlers::get_settings))
        .with_state(service)
}

/// Admin routes; the admin auth middleware is layered on by the caller
pub fn admin_routes(service: Arc<SettingsService>) -> Router {
    Router::new()
        .route(
            "/admin/settings",
            put(handlers::update_settings).get(handlers::list_settings),
        )
        .with_state(service)
}
