/// Cache TTL for the materialized category tree (per locale)
pub const CATEGORY_TREE_TTL_SECS: u64 = 600;

/// Cache TTL for the flat settings map
pub const SETTINGS_TTL_SECS: u64 = 86_400;

/// Maximum depth of the public category tree (root -> child -> grandchild)
pub const MAX_TREE_DEPTH: usize = 3;

/// Hop bound when walking a parent chain, guarding against corrupted data
/// forming a cycle
pub const MAX_PARENT_HOPS: usize = 16;

/// Separator used in admin breadcrumb paths
pub const ANCESTOR_PATH_SEPARATOR: &str = " › ";
