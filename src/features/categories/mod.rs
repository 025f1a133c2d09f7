//! Category catalogue feature: a self-referencing category tree with
//! per-locale name translations.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/{locale}/categories` | No | Cached locale-resolved tree |
//! | GET | `/admin/categories` | Bearer | All categories with breadcrumbs |
//! | GET | `/admin/categories/{id}` | Bearer | One category with parent/children |
//! | POST | `/admin/categories` | Bearer | Create category + translations |
//! | PUT | `/admin/categories/{id}` | Bearer | Partial update, translation upserts |
//! | DELETE | `/admin/categories/{id}` | Bearer | Delete with cascade |
//!
//! Every successful write evicts the cached tree for all supported locales.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CategoryService;
