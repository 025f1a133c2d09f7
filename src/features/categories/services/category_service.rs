use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::core::cache::ViewCache;
use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    build_ancestor_path, index_translations, CategoryAdminDto, CategoryDetailDto,
    CategorySummaryDto, CategoryTranslationDto, CategoryTreeNodeDto, CreateCategoryDto,
    TranslationBodyDto, UpdateCategoryDto,
};
use crate::features::categories::models::{Category, CategoryTranslation};
use crate::shared::constants::MAX_PARENT_HOPS;
use crate::shared::locale::Locale;

const CATEGORY_COLUMNS: &str =
    "id, parent_id, slug, image, sort_order, is_active, created_at, updated_at";

/// Service for category CRUD and the cached, locale-resolved public tree.
///
/// Every successful write evicts the cached tree for all supported locales:
/// a translation change does not know which locales a reader cares about,
/// so the eviction is deliberately conservative.
pub struct CategoryService {
    pool: PgPool,
    cache: Arc<dyn ViewCache>,
    tree_ttl: Duration,
}

impl CategoryService {
    pub fn new(pool: PgPool, cache: Arc<dyn ViewCache>, tree_ttl: Duration) -> Self {
        Self {
            pool,
            cache,
            tree_ttl,
        }
    }

    fn tree_cache_key(locale: Locale) -> String {
        format!("categories:{}", locale)
    }

    fn evict_tree_cache(&self) {
        for locale in Locale::ALL {
            self.cache.evict(&Self::tree_cache_key(locale));
        }
        tracing::debug!("Category tree cache evicted for all locales");
    }

    /// Public tree for one locale: `{"categories": [Node, ...]}`.
    ///
    /// On a miss the tree is recomputed synchronously and cached before
    /// returning; concurrent misses may both recompute, which is harmless
    /// because the computation is pure.
    pub async fn tree(&self, locale: Locale) -> Result<serde_json::Value> {
        let key = Self::tree_cache_key(locale);
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("Category tree cache hit: {}", key);
            return Ok(cached);
        }

        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE is_active = TRUE ORDER BY sort_order, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load active categories: {:?}", e);
            AppError::Database(e)
        })?;

        let translations = sqlx::query_as::<_, CategoryTranslation>(
            "SELECT t.id, t.category_id, t.language_code, t.name \
             FROM category_translations t \
             JOIN categories c ON c.id = t.category_id \
             WHERE c.is_active = TRUE",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load category translations: {:?}", e);
            AppError::Database(e)
        })?;

        let forest = CategoryTreeNodeDto::build_forest(&categories, &translations, locale);
        let view = serde_json::json!({ "categories": forest });
        self.cache.put(&key, view.clone(), self.tree_ttl);
        Ok(view)
    }

    /// Admin list: every category, active or not, with translations and
    /// breadcrumb path, ordered by (sort_order, id). Parent chains are
    /// resolved from the single flat result, not via per-row lookups.
    pub async fn list_admin(&self) -> Result<Vec<CategoryAdminDto>> {
        let categories = self.fetch_all().await?;
        let translations = self.fetch_all_translations().await?;

        let index = index_translations(&translations);
        let by_id: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();

        let mut grouped: HashMap<Uuid, Vec<CategoryTranslationDto>> = HashMap::new();
        for t in translations.iter().cloned() {
            grouped.entry(t.category_id).or_default().push(t.into());
        }

        Ok(categories
            .iter()
            .map(|category| {
                let mut own = grouped.remove(&category.id).unwrap_or_default();
                own.sort_by(|a, b| a.language_code.cmp(&b.language_code));
                let path = build_ancestor_path(category, &by_id, &index);
                CategoryAdminDto::from_parts(category, own, path)
            })
            .collect())
    }

    /// Admin detail: one category with direct parent, direct children,
    /// translations and breadcrumb path.
    pub async fn get_admin(&self, id: Uuid) -> Result<CategoryDetailDto> {
        let categories = self.fetch_all().await?;
        let category = categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        let translations = self.fetch_all_translations().await?;
        let index = index_translations(&translations);
        let by_id: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();

        let parent = category
            .parent_id
            .and_then(|pid| by_id.get(&pid))
            .map(|p| CategorySummaryDto::from(*p));

        let mut children: Vec<&Category> = categories
            .iter()
            .filter(|c| c.parent_id == Some(id))
            .collect();
        children.sort_by_key(|c| (c.sort_order, c.id));
        let children = children.into_iter().map(CategorySummaryDto::from).collect();

        let mut own: Vec<CategoryTranslationDto> = translations
            .iter()
            .filter(|t| t.category_id == id)
            .cloned()
            .map(Into::into)
            .collect();
        own.sort_by(|a, b| a.language_code.cmp(&b.language_code));

        let path = build_ancestor_path(category, &by_id, &index);

        Ok(CategoryDetailDto::from_parts(
            category, own, path, parent, children,
        ))
    }

    /// Creates a category with optional initial translations, then evicts
    /// the cached tree for every locale.
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryDetailDto> {
        let slug = required_slug(dto.slug.as_deref())?;
        let translations = validated_translations(dto.translations.as_ref())?;
        self.ensure_slug_available(&slug, None).await?;
        if let Some(parent_id) = dto.parent_id {
            self.ensure_parent_exists(parent_id).await?;
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let category = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (slug, parent_id, image, sort_order, is_active) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(&slug)
        .bind(dto.parent_id)
        .bind(&dto.image)
        .bind(dto.sort_order.unwrap_or(0))
        .bind(dto.is_active.unwrap_or(true))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category: {:?}", e);
            AppError::Database(e)
        })?;

        for (language_code, name) in &translations {
            upsert_translation(&mut tx, category.id, language_code, name).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Category created: id={}, slug={}", category.id, category.slug);
        self.evict_tree_cache();
        self.get_admin(category.id).await
    }

    /// Partial update; translation entries are upserts keyed by language
    /// code. A new parent equal to the category or one of its descendants
    /// is rejected to keep the parent graph acyclic.
    pub async fn update(&self, id: Uuid, dto: UpdateCategoryDto) -> Result<CategoryDetailDto> {
        let translations = validated_translations(dto.translations.as_ref())?;
        let existing = self.fetch_one(id).await?;

        let slug = dto.slug.unwrap_or_else(|| existing.slug.clone());
        if slug != existing.slug {
            self.ensure_slug_available(&slug, Some(id)).await?;
        }

        let parent_id = match dto.parent_id {
            Some(parent) => parent,
            None => existing.parent_id,
        };
        if let Some(new_parent) = parent_id {
            if existing.parent_id != Some(new_parent) {
                self.ensure_parent_exists(new_parent).await?;
            }
            self.ensure_no_parent_cycle(id, new_parent).await?;
        }

        let image = match dto.image {
            Some(image) => image,
            None => existing.image.clone(),
        };
        let sort_order = dto.sort_order.unwrap_or(existing.sort_order);
        let is_active = dto.is_active.unwrap_or(existing.is_active);

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            "UPDATE categories \
             SET slug = $2, parent_id = $3, image = $4, sort_order = $5, is_active = $6, \
                 updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&slug)
        .bind(parent_id)
        .bind(&image)
        .bind(sort_order)
        .bind(is_active)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update category {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        for (language_code, name) in &translations {
            upsert_translation(&mut tx, id, language_code, name).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Category updated: id={}, slug={}", id, slug);
        self.evict_tree_cache();
        self.get_admin(id).await
    }

    /// Deletes a category; the storage layer cascades onto descendants and
    /// translations. Idempotent at the API level: a second delete is a 404.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete category {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        tracing::info!(
            "Category deleted: id={} (cascade removed descendants and translations)",
            id
        );
        self.evict_tree_cache();
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY sort_order, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn fetch_all_translations(&self) -> Result<Vec<CategoryTranslation>> {
        sqlx::query_as::<_, CategoryTranslation>(
            "SELECT id, category_id, language_code, name FROM category_translations",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list category translations: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn fetch_one(&self, id: Uuid) -> Result<Category> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    async fn ensure_slug_available(&self, slug: &str, exclude: Option<Uuid>) -> Result<()> {
        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM categories WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check slug uniqueness: {:?}", e);
            AppError::Database(e)
        })?;

        if taken > 0 {
            return Err(AppError::field_validation(
                "slug",
                "duplicate",
                "Slug is already taken",
            ));
        }
        Ok(())
    }

    async fn ensure_parent_exists(&self, parent_id: Uuid) -> Result<()> {
        let found = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE id = $1")
            .bind(parent_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check parent existence: {:?}", e);
                AppError::Database(e)
            })?;

        if found == 0 {
            return Err(AppError::field_validation(
                "parent_id",
                "unknown_parent",
                "Parent category does not exist",
            ));
        }
        Ok(())
    }

    /// Rejects re-parenting that would make the parent graph cyclic, by
    /// walking the candidate parent's ancestor chain (hop-bounded).
    async fn ensure_no_parent_cycle(&self, id: Uuid, new_parent: Uuid) -> Result<()> {
        if new_parent == id {
            return Err(AppError::field_validation(
                "parent_id",
                "cycle",
                "Category cannot be its own parent",
            ));
        }

        let mut current = Some(new_parent);
        let mut hops = 0;
        while let Some(cursor) = current {
            if hops >= MAX_PARENT_HOPS {
                break;
            }
            hops += 1;

            let parent = sqlx::query_scalar::<_, Option<Uuid>>(
                "SELECT parent_id FROM categories WHERE id = $1",
            )
            .bind(cursor)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to walk parent chain: {:?}", e);
                AppError::Database(e)
            })?;

            match parent {
                Some(Some(parent_id)) if parent_id == id => {
                    return Err(AppError::field_validation(
                        "parent_id",
                        "cycle",
                        "New parent is a descendant of this category",
                    ));
                }
                Some(next) => current = next,
                None => break,
            }
        }
        Ok(())
    }
}

async fn upsert_translation(
    tx: &mut Transaction<'_, Postgres>,
    category_id: Uuid,
    language_code: &str,
    name: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO category_translations (category_id, language_code, name) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (category_id, language_code) DO UPDATE SET name = EXCLUDED.name",
    )
    .bind(category_id)
    .bind(language_code)
    .bind(name)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert translation: {:?}", e);
        AppError::Database(e)
    })?;
    Ok(())
}

/// A create body without a slug is a validation failure like any other bad
/// value, reported under the `slug` key rather than as a parse error.
fn required_slug(slug: Option<&str>) -> Result<String> {
    match slug {
        Some(s) => Ok(s.to_string()),
        None => Err(AppError::field_validation(
            "slug",
            "required",
            "Slug is required",
        )),
    }
}

/// Checks translation bodies before any row is touched: language codes must
/// be supported and names pass field validation. Returns (language, name)
/// pairs in deterministic order.
fn validated_translations(
    translations: Option<&HashMap<String, TranslationBodyDto>>,
) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    if let Some(map) = translations {
        for (language_code, body) in map {
            if Locale::parse(language_code).is_none() {
                return Err(AppError::field_validation(
                    "translations",
                    "unknown_locale",
                    &format!("Unsupported language code: {}", language_code),
                ));
            }
            body.validate().map_err(|e| AppError::validation(&e))?;
            out.push((language_code.clone(), body.name.clone()));
        }
        out.sort();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn body(name: &str) -> TranslationBodyDto {
        TranslationBodyDto {
            name: name.to_string(),
        }
    }

    /// Cache fake that records evictions and can serve a canned view.
    #[derive(Default)]
    struct RecordingCache {
        view: Option<serde_json::Value>,
        evicted: Mutex<Vec<String>>,
    }

    impl ViewCache for RecordingCache {
        fn get(&self, _key: &str) -> Option<serde_json::Value> {
            self.view.clone()
        }

        fn put(&self, _key: &str, _value: serde_json::Value, _ttl: Duration) {}

        fn evict(&self, key: &str) {
            self.evicted.lock().unwrap().push(key.to_string());
        }
    }

    // connect_lazy never touches the network, so these tests run without a
    // database as long as the code under test stops before a query.
    fn service_with_cache(cache: Arc<RecordingCache>) -> CategoryService {
        let pool = PgPool::connect_lazy("postgres://localhost/kedai").unwrap();
        CategoryService::new(pool, cache, Duration::from_secs(600))
    }

    #[tokio::test]
    async fn test_write_eviction_covers_all_locales() {
        let cache = Arc::new(RecordingCache::default());
        let service = service_with_cache(Arc::clone(&cache));

        service.evict_tree_cache();

        let evicted = cache.evicted.lock().unwrap();
        assert_eq!(
            *evicted,
            vec!["categories:en-MY", "categories:ms-MY", "categories:zh-CN"]
        );
    }

    #[tokio::test]
    async fn test_tree_serves_cached_view_without_storage() {
        let view = serde_json::json!({ "categories": [] });
        let cache = Arc::new(RecordingCache {
            view: Some(view.clone()),
            evicted: Mutex::new(Vec::new()),
        });
        let service = service_with_cache(cache);

        let served = service.tree(Locale::EnMy).await.unwrap();
        assert_eq!(served, view);
    }

    #[tokio::test]
    async fn test_create_without_slug_reports_field_error() {
        let cache = Arc::new(RecordingCache::default());
        let service = service_with_cache(Arc::clone(&cache));

        let dto: CreateCategoryDto = serde_json::from_str(r#"{"sort_order": 1}"#).unwrap();
        let err = service.create(dto).await.unwrap_err();

        match err {
            AppError::Validation(value) => assert!(value.get("slug").is_some()),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(cache.evicted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_validated_translations_accepts_supported_locales() {
        let mut map = std::collections::HashMap::new();
        map.insert("en-MY".to_string(), body("Supplement"));
        map.insert("zh-CN".to_string(), body("保健品"));

        let pairs = validated_translations(Some(&map)).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "en-MY");
    }

    #[test]
    fn test_validated_translations_rejects_unknown_locale() {
        let mut map = std::collections::HashMap::new();
        map.insert("fr-FR".to_string(), body("Complément"));

        let err = validated_translations(Some(&map)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_validated_translations_rejects_empty_name() {
        let mut map = std::collections::HashMap::new();
        map.insert("en-MY".to_string(), body(""));

        let err = validated_translations(Some(&map)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_validated_translations_empty_input() {
        assert!(validated_translations(None).unwrap().is_empty());
    }
}
