use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::core::cache::ViewCache;
use crate::core::error::{AppError, Result};
use crate::features::settings::dtos::{SettingResponseDto, UpdateSettingsDto};
use crate::features::settings::models::Setting;

const SETTINGS_CACHE_KEY: &str = "settings";
const MAX_KEY_LENGTH: usize = 100;

/// Service for the flat key/value settings map.
///
/// Uses the same materialized-view cache as the category tree: one entry,
/// long TTL, fully evicted on any setting write.
pub struct SettingsService {
    pool: PgPool,
    cache: Arc<dyn ViewCache>,
    ttl: Duration,
}

impl SettingsService {
    pub fn new(pool: PgPool, cache: Arc<dyn ViewCache>, ttl: Duration) -> Self {
        Self { pool, cache, ttl }
    }

    /// Public map view: `{key: value, ...}`, cached.
    pub async fn map(&self) -> Result<serde_json::Value> {
        if let Some(cached) = self.cache.get(SETTINGS_CACHE_KEY) {
            tracing::debug!("Settings cache hit");
            return Ok(cached);
        }

        let settings = self.fetch_all().await?;
        let mut map = serde_json::Map::new();
        for setting in settings {
            map.insert(setting.key, serde_json::Value::String(setting.value));
        }

        let view = serde_json::Value::Object(map);
        self.cache.put(SETTINGS_CACHE_KEY, view.clone(), self.ttl);
        Ok(view)
    }

    /// Admin list of all setting rows, ordered by key.
    pub async fn list_admin(&self) -> Result<Vec<SettingResponseDto>> {
        let settings = self.fetch_all().await?;
        Ok(settings.into_iter().map(Into::into).collect())
    }

    /// Bulk upsert keyed by setting key; evicts the cached map on success.
    pub async fn upsert(&self, dto: UpdateSettingsDto) -> Result<Vec<SettingResponseDto>> {
        let mut pairs: Vec<(String, String)> = dto.settings.into_iter().collect();
        pairs.sort();

        for (key, _) in &pairs {
            if key.is_empty() || key.len() > MAX_KEY_LENGTH {
                return Err(AppError::field_validation(
                    "settings",
                    "invalid_key",
                    &format!("Setting key must be 1-{} characters", MAX_KEY_LENGTH),
                ));
            }
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        for (key, value) in &pairs {
            sqlx::query(
                "INSERT INTO settings (key, value) VALUES ($1, $2) \
                 ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert setting {}: {:?}", key, e);
                AppError::Database(e)
            })?;
        }
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Settings upserted: {} keys", pairs.len());
        self.cache.evict(SETTINGS_CACHE_KEY);
        self.list_admin().await
    }

    async fn fetch_all(&self) -> Result<Vec<Setting>> {
        sqlx::query_as::<_, Setting>(
            "SELECT id, key, value, created_at, updated_at FROM settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list settings: {:?}", e);
            AppError::Database(e)
        })
    }
}
