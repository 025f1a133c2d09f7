use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::settings::{dtos as settings_dtos, handlers as settings_handlers};
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories (public)
        categories_handlers::category_handler::list_category_tree,
        // Categories (admin)
        categories_handlers::admin_category_handler::list_categories,
        categories_handlers::admin_category_handler::get_category,
        categories_handlers::admin_category_handler::create_category,
        categories_handlers::admin_category_handler::update_category,
        categories_handlers::admin_category_handler::delete_category,
        // Settings (public)
        settings_handlers::settings_handler::get_settings,
        // Settings (admin)
        settings_handlers::settings_handler::list_settings,
        settings_handlers::settings_handler::update_settings,
    ),
    components(
        schemas(
            // Categories
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::TranslationBodyDto,
            categories_dtos::CategoryTranslationDto,
            categories_dtos::CategoryAdminDto,
            categories_dtos::CategorySummaryDto,
            categories_dtos::CategoryDetailDto,
            categories_dtos::CategoryTreeNodeDto,
            ApiResponse<Vec<categories_dtos::CategoryAdminDto>>,
            ApiResponse<categories_dtos::CategoryDetailDto>,
            // Settings
            settings_dtos::UpdateSettingsDto,
            settings_dtos::SettingResponseDto,
            ApiResponse<Vec<settings_dtos::SettingResponseDto>>,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "categories", description = "Public locale-resolved category tree"),
        (name = "admin-categories", description = "Admin category CRUD"),
        (name = "settings", description = "Public settings map"),
        (name = "admin-settings", description = "Admin settings management"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("opaque")
                        .build(),
                ),
            );
        }
    }
}

pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
