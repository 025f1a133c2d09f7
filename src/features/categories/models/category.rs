use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a catalogue category.
///
/// `parent_id` is a nullable self-reference; the storage layer cascades
/// deletes down the subtree and onto translations.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub slug: String,
    pub image: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-locale display name for a category. At most one row per
/// (category, language_code) pair.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryTranslation {
    pub id: Uuid,
    pub category_id: Uuid,
    pub language_code: String,
    pub name: String,
}
