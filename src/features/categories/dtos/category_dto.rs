use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::{Category, CategoryTranslation};
use crate::shared::constants::{ANCESTOR_PATH_SEPARATOR, MAX_PARENT_HOPS, MAX_TREE_DEPTH};
use crate::shared::locale::Locale;
use crate::shared::validation::SLUG_REGEX;

/// Translation payload inside create/update bodies: `{lang: {name}}`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TranslationBodyDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Request DTO for creating a category.
///
/// `slug` is optional at the serde layer so a body without one still reaches
/// field validation and comes back as a `slug`-keyed error, not a parse
/// failure.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(
        length(min = 1, max = 100, message = "Slug must be 1-100 characters"),
        regex(
            path = *SLUG_REGEX,
            message = "Slug must be lowercase alphanumeric with hyphens"
        )
    )]
    pub slug: Option<String>,

    pub parent_id: Option<Uuid>,

    pub image: Option<String>,

    #[validate(range(min = 0, message = "Sort order must be non-negative"))]
    pub sort_order: Option<i32>,

    pub is_active: Option<bool>,

    /// Initial translations keyed by language code
    pub translations: Option<HashMap<String, TranslationBodyDto>>,
}

/// Request DTO for partially updating a category.
///
/// `parent_id` and `image` distinguish "absent" (leave unchanged) from an
/// explicit `null` (detach parent / clear image), hence the double `Option`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(
        length(min = 1, max = 100, message = "Slug must be 1-100 characters"),
        regex(
            path = *SLUG_REGEX,
            message = "Slug must be lowercase alphanumeric with hyphens"
        )
    )]
    pub slug: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,

    #[validate(range(min = 0, message = "Sort order must be non-negative"))]
    pub sort_order: Option<i32>,

    pub is_active: Option<bool>,

    /// Translation upserts keyed by language code
    pub translations: Option<HashMap<String, TranslationBodyDto>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Response DTO for a single translation row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryTranslationDto {
    pub language_code: String,
    pub name: String,
}

impl From<CategoryTranslation> for CategoryTranslationDto {
    fn from(t: CategoryTranslation) -> Self {
        Self {
            language_code: t.language_code,
            name: t.name,
        }
    }
}

/// Admin list/detail row: category with translations and breadcrumb path
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryAdminDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub slug: String,
    pub image: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub translations: Vec<CategoryTranslationDto>,
    pub ancestor_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryAdminDto {
    pub fn from_parts(
        category: &Category,
        translations: Vec<CategoryTranslationDto>,
        ancestor_path: String,
    ) -> Self {
        Self {
            id: category.id,
            parent_id: category.parent_id,
            slug: category.slug.clone(),
            image: category.image.clone(),
            sort_order: category.sort_order,
            is_active: category.is_active,
            translations,
            ancestor_path,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// Compact category reference used for parent/children in the detail view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategorySummaryDto {
    pub id: Uuid,
    pub slug: String,
    pub sort_order: i32,
    pub is_active: bool,
}

impl From<&Category> for CategorySummaryDto {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id,
            slug: c.slug.clone(),
            sort_order: c.sort_order,
            is_active: c.is_active,
        }
    }
}

/// Admin detail view: one category with its direct parent and children
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryDetailDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub slug: String,
    pub image: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub translations: Vec<CategoryTranslationDto>,
    pub ancestor_path: String,
    pub parent: Option<CategorySummaryDto>,
    pub children: Vec<CategorySummaryDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryDetailDto {
    pub fn from_parts(
        category: &Category,
        translations: Vec<CategoryTranslationDto>,
        ancestor_path: String,
        parent: Option<CategorySummaryDto>,
        children: Vec<CategorySummaryDto>,
    ) -> Self {
        Self {
            id: category.id,
            parent_id: category.parent_id,
            slug: category.slug.clone(),
            image: category.image.clone(),
            sort_order: category.sort_order,
            is_active: category.is_active,
            translations,
            ancestor_path,
            parent,
            children,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// Node of the public, locale-resolved category tree
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeNodeDto {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub image: Option<String>,
    pub children: Vec<CategoryTreeNodeDto>,
}

/// Translation names indexed by category id, then language code.
pub type TranslationIndex = HashMap<Uuid, HashMap<String, String>>;

pub fn index_translations(translations: &[CategoryTranslation]) -> TranslationIndex {
    let mut index: TranslationIndex = HashMap::new();
    for t in translations {
        index
            .entry(t.category_id)
            .or_default()
            .insert(t.language_code.clone(), t.name.clone());
    }
    index
}

/// Resolves a display name. Total: requested locale, then the default
/// locale, then the slug.
pub fn resolve_name(category: &Category, index: &TranslationIndex, locale: Locale) -> String {
    if let Some(names) = index.get(&category.id) {
        for candidate in locale.fallback_chain() {
            if let Some(name) = names.get(candidate.as_str()) {
                return name.clone();
            }
        }
    }
    category.slug.clone()
}

/// Breadcrumb from the root down to `category`, names resolved in the
/// default locale, joined with `›`. The walk is hop-bounded so corrupted
/// parent data cannot loop forever.
pub fn build_ancestor_path(
    category: &Category,
    by_id: &HashMap<Uuid, &Category>,
    index: &TranslationIndex,
) -> String {
    let mut parts = vec![resolve_name(category, index, Locale::DEFAULT)];
    let mut next = category.parent_id;
    let mut hops = 0;

    while let Some(parent_id) = next {
        if hops >= MAX_PARENT_HOPS {
            break;
        }
        hops += 1;

        match by_id.get(&parent_id) {
            Some(parent) => {
                parts.push(resolve_name(parent, index, Locale::DEFAULT));
                next = parent.parent_id;
            }
            None => break,
        }
    }

    parts.reverse();
    parts.join(ANCESTOR_PATH_SEPARATOR)
}

impl CategoryTreeNodeDto {
    /// Builds the public forest for `locale` from flat rows.
    ///
    /// Only active categories appear, at every level: an active grandchild
    /// under an inactive child is excluded because its parent is never
    /// visited. Roots are the active categories without a parent. Siblings
    /// are ordered by (sort_order, id) and depth is capped at three levels.
    pub fn build_forest(
        categories: &[Category],
        translations: &[CategoryTranslation],
        locale: Locale,
    ) -> Vec<CategoryTreeNodeDto> {
        let index = index_translations(translations);

        let mut children_of: HashMap<Option<Uuid>, Vec<&Category>> = HashMap::new();
        for category in categories.iter().filter(|c| c.is_active) {
            children_of.entry(category.parent_id).or_default().push(category);
        }
        for siblings in children_of.values_mut() {
            siblings.sort_by_key(|c| (c.sort_order, c.id));
        }

        children_of
            .get(&None)
            .map(|roots| {
                roots
                    .iter()
                    .map(|root| Self::build_node(root, &children_of, &index, locale, MAX_TREE_DEPTH))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn build_node(
        category: &Category,
        children_of: &HashMap<Option<Uuid>, Vec<&Category>>,
        index: &TranslationIndex,
        locale: Locale,
        remaining_depth: usize,
    ) -> CategoryTreeNodeDto {
        let children = if remaining_depth > 1 {
            children_of
                .get(&Some(category.id))
                .map(|kids| {
                    kids.iter()
                        .map(|child| {
                            Self::build_node(child, children_of, index, locale, remaining_depth - 1)
                        })
                        .collect()
                })
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        CategoryTreeNodeDto {
            id: category.id,
            slug: category.slug.clone(),
            name: resolve_name(category, index, locale),
            image: category.image.clone(),
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(n: u128, parent: Option<u128>, slug: &str, sort_order: i32, is_active: bool) -> Category {
        Category {
            id: Uuid::from_u128(n),
            parent_id: parent.map(Uuid::from_u128),
            slug: slug.to_string(),
            image: None,
            sort_order,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn tr(n: u128, category: u128, language_code: &str, name: &str) -> CategoryTranslation {
        CategoryTranslation {
            id: Uuid::from_u128(n),
            category_id: Uuid::from_u128(category),
            language_code: language_code.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_resolve_name_prefers_requested_locale() {
        let category = cat(1, None, "supplement", 0, true);
        let index = index_translations(&[
            tr(10, 1, "en-MY", "Supplement"),
            tr(11, 1, "zh-CN", "保健品"),
        ]);

        assert_eq!(resolve_name(&category, &index, Locale::ZhCn), "保健品");
    }

    #[test]
    fn test_resolve_name_falls_back_to_default_locale() {
        let category = cat(1, None, "supplement", 0, true);
        let index = index_translations(&[tr(10, 1, "en-MY", "Supplement")]);

        assert_eq!(resolve_name(&category, &index, Locale::MsMy), "Supplement");
    }

    #[test]
    fn test_resolve_name_falls_back_to_slug() {
        let category = cat(1, None, "supplement", 0, true);

        assert_eq!(
            resolve_name(&category, &index_translations(&[]), Locale::MsMy),
            "supplement"
        );
    }

    #[test]
    fn test_forest_nests_child_under_root() {
        // supplement (root) with child vitamins
        let categories = vec![
            cat(1, None, "supplement", 0, true),
            cat(2, Some(1), "vitamins", 0, true),
        ];
        let translations = vec![
            tr(10, 1, "en-MY", "Supplement"),
            tr(11, 2, "en-MY", "Vitamins"),
        ];

        let forest = CategoryTreeNodeDto::build_forest(&categories, &translations, Locale::EnMy);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "Supplement");
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].name, "Vitamins");
        assert!(forest[0].children[0].children.is_empty());
    }

    #[test]
    fn test_forest_excludes_inactive_child() {
        let categories = vec![
            cat(1, None, "supplement", 0, true),
            cat(2, Some(1), "vitamins", 0, false),
        ];

        let forest = CategoryTreeNodeDto::build_forest(&categories, &[], Locale::EnMy);

        assert_eq!(forest.len(), 1);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_forest_excludes_subtree_of_inactive_parent() {
        // Active grandchild under an inactive child must not surface anywhere
        let categories = vec![
            cat(1, None, "supplement", 0, true),
            cat(2, Some(1), "vitamins", 0, false),
            cat(3, Some(2), "vitamin-c", 0, true),
        ];

        let forest = CategoryTreeNodeDto::build_forest(&categories, &[], Locale::EnMy);

        assert_eq!(forest.len(), 1);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_forest_depth_capped_at_three_levels() {
        let categories = vec![
            cat(1, None, "a", 0, true),
            cat(2, Some(1), "b", 0, true),
            cat(3, Some(2), "c", 0, true),
            cat(4, Some(3), "d", 0, true),
        ];

        let forest = CategoryTreeNodeDto::build_forest(&categories, &[], Locale::EnMy);

        let grandchild = &forest[0].children[0].children[0];
        assert_eq!(grandchild.slug, "c");
        assert!(grandchild.children.is_empty());
    }

    #[test]
    fn test_forest_orders_by_sort_order_then_id() {
        let categories = vec![
            cat(3, None, "third", 1, true),
            cat(1, None, "first", 0, true),
            cat(2, None, "second", 0, true),
        ];

        let forest = CategoryTreeNodeDto::build_forest(&categories, &[], Locale::EnMy);

        let slugs: Vec<&str> = forest.iter().map(|n| n.slug.as_str()).collect();
        assert_eq!(slugs, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_ancestor_path_walks_to_root() {
        let categories = vec![
            cat(1, None, "supplement", 0, true),
            cat(2, Some(1), "vitamins", 0, true),
            cat(3, Some(2), "fish-oil", 0, true),
        ];
        let index = index_translations(&[
            tr(10, 1, "en-MY", "Supplement"),
            tr(11, 2, "en-MY", "Vitamins"),
            tr(12, 3, "en-MY", "Fish Oil"),
        ]);
        let by_id: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();

        let path = build_ancestor_path(&categories[2], &by_id, &index);

        assert_eq!(path, "Supplement › Vitamins › Fish Oil");
    }

    #[test]
    fn test_ancestor_path_uses_slug_when_untranslated() {
        let categories = vec![
            cat(1, None, "supplement", 0, true),
            cat(2, Some(1), "vitamins", 0, true),
        ];
        let by_id: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();

        let path = build_ancestor_path(&categories[1], &by_id, &index_translations(&[]));

        assert_eq!(path, "supplement › vitamins");
    }

    #[test]
    fn test_ancestor_path_terminates_on_cycle() {
        // Corrupted data: two categories pointing at each other
        let categories = vec![
            cat(1, Some(2), "a", 0, true),
            cat(2, Some(1), "b", 0, true),
        ];
        let by_id: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();

        let path = build_ancestor_path(&categories[0], &by_id, &index_translations(&[]));

        // Bounded walk: it returns something rather than hanging
        assert!(path.contains('a'));
    }

    #[test]
    fn test_create_dto_deserializes_without_slug() {
        let dto: CreateCategoryDto = serde_json::from_str(r#"{"sort_order": 1}"#).unwrap();
        assert_eq!(dto.slug, None);
        assert_eq!(dto.sort_order, Some(1));
    }

    #[test]
    fn test_update_dto_distinguishes_null_from_absent() {
        let detach: UpdateCategoryDto = serde_json::from_str(r#"{"parent_id": null}"#).unwrap();
        assert_eq!(detach.parent_id, Some(None));

        let untouched: UpdateCategoryDto = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.parent_id, None);
    }
}
