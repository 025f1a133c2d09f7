use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::settings::models::Setting;

/// Admin row view of a setting
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingResponseDto {
    pub id: Uuid,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Setting> for SettingResponseDto {
    fn from(s: Setting) -> Self {
        Self {
            id: s.id,
            key: s.key,
            value: s.value,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Bulk upsert body: `{"settings": {"site_name": "Kedai", ...}}`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateSettingsDto {
    #[validate(length(min = 1, message = "At least one setting is required"))]
    pub settings: HashMap<String, String>,
}
